//! Integration tests for the CodeBase stub.
//!
//! `ScriptedDelegate` plays back a fixed list of outcomes and counts every
//! request and every released reply, so the tests can check the retry and
//! release behavior of each operation. `Catalog` is a small servant used
//! through `ServantDelegate` for end-to-end round trips.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use orb_cdr::{ByteOrder, CdrWriter, Ior, TaggedProfile, TcKind, TypeCode};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use sending_context::types::{
    FullValueDescription, Repository, RepositoryId, RepositoryIdSeq, Url, UrlSeq, ValueDescSeq,
    ValueMember, PRIVATE_MEMBER,
};
use sending_context::{
    ApplicationFault, CodeBase, CodeBaseError, CodeBaseStub, Delegate, InvokeOutcome, LocalOrb,
    ReplyStream, RequestBuffer, Result, ServantDelegate, StubConfig,
};

// ============================================================================
// Scripted delegate
// ============================================================================

enum Step {
    Reply(Bytes),
    Remarshal,
    Fault(&'static str),
    TransportError,
}

#[derive(Default)]
struct ScriptedDelegate {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<(String, Vec<u8>)>>,
    released: AtomicUsize,
}

impl ScriptedDelegate {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            ..Default::default()
        })
    }

    fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<(String, Vec<u8>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delegate for ScriptedDelegate {
    async fn invoke(&self, request: RequestBuffer) -> Result<InvokeOutcome> {
        self.requests
            .lock()
            .unwrap()
            .push((request.operation().to_string(), request.body().to_vec()));

        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted");
        Ok(match step {
            Step::Reply(body) => InvokeOutcome::Reply(ReplyStream::from_bytes(body, ByteOrder::Big)),
            Step::Remarshal => InvokeOutcome::Remarshal,
            Step::Fault(id) => InvokeOutcome::Fault(ApplicationFault {
                id: id.to_string(),
                stream: ReplyStream::from_bytes(Bytes::new(), ByteOrder::Big),
            }),
            Step::TransportError => {
                return Err(CodeBaseError::Transport("connection reset".into()))
            }
        })
    }

    fn release_reply(&self, _reply: ReplyStream) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn object_reference(&self) -> Ior {
        Ior::new(
            sending_context::CODEBASE_ID,
            vec![TaggedProfile::iiop("scripted", 1, b"scripted")],
        )
    }
}

fn encoded<T: orb_cdr::CdrEncode + ?Sized>(value: &T) -> Bytes {
    let mut w = CdrWriter::new(ByteOrder::Big);
    w.write(value);
    w.into_bytes()
}

fn ok_reply() -> Step {
    Step::Reply(encoded("http://codebase.example/classes/"))
}

// ============================================================================
// Catalog servant
// ============================================================================

struct Catalog {
    repository: Repository,
    descriptions: HashMap<String, FullValueDescription>,
}

impl Catalog {
    fn new() -> Self {
        let point = FullValueDescription {
            name: "Point".into(),
            id: "RMI:demo.Point:0000000000000001".into(),
            version: "1.0".into(),
            members: vec![ValueMember {
                name: "x".into(),
                type_code: TypeCode::Simple(TcKind::Long),
                access: PRIVATE_MEMBER,
                ..Default::default()
            }],
            base_value: "RMI:demo.Shape:0000000000000000".into(),
            is_truncatable: true,
            type_code: TypeCode::value("RMI:demo.Point:0000000000000001", "Point"),
            ..Default::default()
        };
        let shape = FullValueDescription {
            name: "Shape".into(),
            id: "RMI:demo.Shape:0000000000000000".into(),
            is_abstract: true,
            ..Default::default()
        };
        Self {
            repository: Repository(Ior::new(
                "IDL:omg.org/CORBA/Repository:1.0",
                vec![TaggedProfile::iiop("ir.example", 2809, b"InterfaceRepository")],
            )),
            descriptions: [point, shape]
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
        }
    }

    fn lookup(&self, id: &str) -> Result<FullValueDescription> {
        self.descriptions
            .get(id)
            .cloned()
            .ok_or_else(|| CodeBaseError::Application {
                id: "IDL:demo/UnknownValue:1.0".into(),
            })
    }
}

#[async_trait]
impl CodeBase for Catalog {
    async fn get_ir(&self) -> Result<Repository> {
        Ok(self.repository.clone())
    }

    async fn implementation(&self, x: &str) -> Result<Url> {
        Ok(format!("http://codebase.example/classes/{x}"))
    }

    async fn implementations(&self, x: &[RepositoryId]) -> Result<UrlSeq> {
        let mut urls = Vec::with_capacity(x.len());
        for id in x {
            urls.push(self.implementation(id).await?);
        }
        Ok(urls)
    }

    async fn meta(&self, x: &str) -> Result<FullValueDescription> {
        self.lookup(x)
    }

    async fn metas(&self, x: &[RepositoryId]) -> Result<ValueDescSeq> {
        x.iter().map(|id| self.lookup(id)).collect()
    }

    async fn bases(&self, x: &str) -> Result<RepositoryIdSeq> {
        let mut chain = Vec::new();
        let mut current = self.lookup(x)?;
        while !current.base_value.is_empty() {
            chain.push(current.base_value.clone());
            current = self.lookup(&current.base_value)?;
        }
        Ok(chain)
    }
}

fn catalog_reference() -> Ior {
    Ior::new(
        sending_context::CODEBASE_ID,
        vec![TaggedProfile::iiop("codebase.example", 1050, b"CodeBase")],
    )
}

fn catalog_stub(order: ByteOrder) -> CodeBaseStub {
    let delegate = ServantDelegate::new(Arc::new(Catalog::new()), catalog_reference())
        .with_byte_order(order);
    CodeBaseStub::with_delegate(Arc::new(delegate))
}

// ============================================================================
// Round trips through the collocated servant
// ============================================================================

#[tokio::test]
async fn test_get_ir() {
    let stub = catalog_stub(ByteOrder::Big);
    let repo = stub.get_ir().await.unwrap();
    assert_eq!(repo, Catalog::new().repository);
    assert!(!repo.is_nil());
}

#[tokio::test]
async fn test_implementation() {
    let stub = catalog_stub(ByteOrder::Little);
    assert_eq!(
        stub.implementation("RMI:demo.Point:0000000000000001").await.unwrap(),
        "http://codebase.example/classes/RMI:demo.Point:0000000000000001"
    );
}

#[tokio::test]
async fn test_implementations_preserves_order() {
    let stub = catalog_stub(ByteOrder::Big);
    let ids = vec!["b".to_string(), "a".to_string(), String::new()];
    assert_eq!(
        stub.implementations(&ids).await.unwrap(),
        vec![
            "http://codebase.example/classes/b".to_string(),
            "http://codebase.example/classes/a".to_string(),
            "http://codebase.example/classes/".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_meta() {
    let stub = catalog_stub(ByteOrder::Little);
    let fvd = stub.meta("RMI:demo.Point:0000000000000001").await.unwrap();
    assert_eq!(fvd, Catalog::new().lookup("RMI:demo.Point:0000000000000001").unwrap());
}

#[tokio::test]
async fn test_metas() {
    let stub = catalog_stub(ByteOrder::Big);
    let ids = vec![
        "RMI:demo.Shape:0000000000000000".to_string(),
        "RMI:demo.Point:0000000000000001".to_string(),
    ];
    let descriptions = stub.metas(&ids).await.unwrap();
    let names: Vec<_> = descriptions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Shape", "Point"]);
    assert!(descriptions[0].is_abstract);
}

#[tokio::test]
async fn test_bases() {
    let stub = catalog_stub(ByteOrder::Big);
    assert_eq!(
        stub.bases("RMI:demo.Point:0000000000000001").await.unwrap(),
        vec!["RMI:demo.Shape:0000000000000000".to_string()]
    );
}

#[tokio::test]
async fn test_servant_exception_surfaces_as_marshal() {
    let stub = catalog_stub(ByteOrder::Big);
    match stub.meta("RMI:demo.Missing:0").await {
        Err(CodeBaseError::Marshal { id }) => assert_eq!(id, "IDL:demo/UnknownValue:1.0"),
        other => panic!("expected Marshal, got {other:?}"),
    }
}

// ============================================================================
// Request template
// ============================================================================

#[tokio::test]
async fn test_request_named_after_operation_with_marshaled_argument() {
    let delegate = ScriptedDelegate::new(vec![Step::Reply(encoded(&Vec::<String>::new()))]);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    stub.bases("IDL:demo/Value:1.0").await.unwrap();

    let requests = delegate.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "bases");
    assert_eq!(requests[0].1, encoded("IDL:demo/Value:1.0").to_vec());
}

#[tokio::test]
async fn test_get_ir_sends_no_arguments() {
    let delegate = ScriptedDelegate::new(vec![Step::Reply(encoded(&Repository::default()))]);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    assert!(stub.get_ir().await.unwrap().is_nil());
    assert_eq!(delegate.requests(), vec![("get_ir".to_string(), Vec::new())]);
}

// ============================================================================
// Faults
// ============================================================================

#[tokio::test]
async fn test_fault_id_is_carried_exactly() {
    let delegate = ScriptedDelegate::new(vec![Step::Fault("X")]);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    match stub.implementation("anything").await {
        Err(CodeBaseError::Marshal { id }) => assert_eq!(id, "X"),
        other => panic!("expected Marshal, got {other:?}"),
    }
    assert_eq!(delegate.released(), 1);
}

#[tokio::test]
async fn test_every_operation_maps_faults() {
    let delegate = ScriptedDelegate::new((0..6).map(|_| Step::Fault("IDL:x/Y:1.0")).collect());
    let stub = CodeBaseStub::with_delegate(delegate.clone());
    let ids = vec!["a".to_string()];

    let results = [
        stub.get_ir().await.map(|_| ()),
        stub.implementation("a").await.map(|_| ()),
        stub.implementations(&ids).await.map(|_| ()),
        stub.meta("a").await.map(|_| ()),
        stub.metas(&ids).await.map(|_| ()),
        stub.bases("a").await.map(|_| ()),
    ];
    for result in results {
        assert!(matches!(result, Err(CodeBaseError::Marshal { id }) if id == "IDL:x/Y:1.0"));
    }
    assert_eq!(delegate.released(), 6);
}

// ============================================================================
// Remarshal
// ============================================================================

#[tokio::test]
async fn test_remarshal_once_then_success() {
    let delegate = ScriptedDelegate::new(vec![Step::Remarshal, ok_reply()]);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    assert_eq!(
        stub.implementation("RMI:demo.Point:0").await.unwrap(),
        "http://codebase.example/classes/"
    );

    let requests = delegate.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(delegate.released(), 1);
}

#[tokio::test]
async fn test_unbounded_remarshal_keeps_retrying() {
    let mut steps: Vec<Step> = (0..500).map(|_| Step::Remarshal).collect();
    steps.push(ok_reply());
    let delegate = ScriptedDelegate::new(steps);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    assert!(stub.implementation("x").await.is_ok());
    assert_eq!(delegate.requests().len(), 501);
    assert_eq!(delegate.released(), 1);
}

#[tokio::test]
async fn test_remarshal_limit() {
    let delegate = ScriptedDelegate::new((0..3).map(|_| Step::Remarshal).collect());
    let stub = CodeBaseStub::with_delegate(delegate.clone())
        .with_config(StubConfig::default().with_max_remarshals(2));

    assert!(matches!(
        stub.bases("x").await,
        Err(CodeBaseError::RemarshalLimit(2))
    ));
    assert_eq!(delegate.requests().len(), 3);
    assert_eq!(delegate.released(), 0);
}

#[tokio::test]
async fn test_remarshal_within_limit_succeeds() {
    let delegate = ScriptedDelegate::new(vec![Step::Remarshal, Step::Remarshal, ok_reply()]);
    let stub = CodeBaseStub::with_delegate(delegate.clone())
        .with_config(StubConfig::default().with_max_remarshals(2));

    assert!(stub.implementation("x").await.is_ok());
}

#[tokio::test]
async fn test_remarshal_then_fault() {
    let delegate = ScriptedDelegate::new(vec![Step::Remarshal, Step::Fault("IDL:moved/Gone:1.0")]);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    assert!(matches!(
        stub.meta("x").await,
        Err(CodeBaseError::Marshal { .. })
    ));
    assert_eq!(delegate.released(), 1);
}

// ============================================================================
// Reply release
// ============================================================================

#[tokio::test]
async fn test_success_releases_once() {
    let delegate = ScriptedDelegate::new(vec![ok_reply()]);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    stub.implementation("x").await.unwrap();
    assert_eq!(delegate.released(), 1);
}

#[tokio::test]
async fn test_undecodable_reply_is_released() {
    let delegate = ScriptedDelegate::new(vec![Step::Reply(Bytes::from_static(&[0, 0]))]);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    assert!(matches!(
        stub.implementation("x").await,
        Err(CodeBaseError::Cdr(_))
    ));
    assert_eq!(delegate.released(), 1);
}

#[tokio::test]
async fn test_transport_error_opens_no_reply() {
    let delegate = ScriptedDelegate::new(vec![Step::TransportError]);
    let stub = CodeBaseStub::with_delegate(delegate.clone());

    assert!(matches!(
        stub.get_ir().await,
        Err(CodeBaseError::Transport(_))
    ));
    assert_eq!(delegate.released(), 0);
}

// ============================================================================
// Delegate binding and persistence
// ============================================================================

#[tokio::test]
async fn test_set_delegate_makes_stub_usable() {
    let mut stub = CodeBaseStub::new();
    assert!(matches!(stub.get_ir().await, Err(CodeBaseError::NoDelegate)));

    stub.set_delegate(ScriptedDelegate::new(vec![Step::Reply(encoded(&Repository::default()))]));
    assert!(stub.get_ir().await.is_ok());
}

#[tokio::test]
async fn test_persist_and_restore() {
    let orb = LocalOrb::new();
    let servant = ServantDelegate::new(Arc::new(Catalog::new()), catalog_reference());
    orb.register(Arc::new(servant));

    let stub = orb.string_to_object(&catalog_reference().to_string()).unwrap();
    let mut stored = Vec::new();
    stub.write_object(&mut stored).unwrap();

    let restored = CodeBaseStub::read_object(&mut stored.as_slice(), &orb).unwrap();
    assert_eq!(
        orb.object_to_string(&restored).unwrap(),
        catalog_reference().to_string()
    );
    assert_eq!(
        restored.bases("RMI:demo.Point:0000000000000001").await.unwrap(),
        vec!["RMI:demo.Shape:0000000000000000".to_string()]
    );
}

#[test]
fn test_persisted_form_is_length_prefixed_ior() {
    let stub = CodeBaseStub::with_delegate(ScriptedDelegate::new(Vec::new()));
    let mut stored = Vec::new();
    stub.write_object(&mut stored).unwrap();

    let text = stub.delegate().unwrap().object_reference().to_string();
    assert_eq!(&stored[..2], &(text.len() as u16).to_be_bytes());
    assert_eq!(&stored[2..], text.as_bytes());
}

#[test]
fn test_restore_unknown_reference() {
    let stub = CodeBaseStub::with_delegate(ScriptedDelegate::new(Vec::new()));
    let mut stored = Vec::new();
    stub.write_object(&mut stored).unwrap();

    let orb = LocalOrb::new();
    assert!(matches!(
        CodeBaseStub::read_object(&mut stored.as_slice(), &orb),
        Err(CodeBaseError::Unresolvable(_))
    ));
}

#[test]
fn test_restore_truncated_stream() {
    let orb = LocalOrb::new();
    assert!(matches!(
        CodeBaseStub::read_object(&mut &[0u8, 40, b'I'][..], &orb),
        Err(CodeBaseError::Persistence(_))
    ));
}

#[test]
fn test_persist_unbound_stub() {
    let mut stored = Vec::new();
    assert!(matches!(
        CodeBaseStub::new().write_object(&mut stored),
        Err(CodeBaseError::NoDelegate)
    ));
    assert!(stored.is_empty());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_implementations_round_trip(ids in prop::collection::vec("[ -~]{0,40}", 0..8)) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let urls = rt.block_on(catalog_stub(ByteOrder::Little).implementations(&ids)).unwrap();
        let expected: Vec<String> = ids
            .iter()
            .map(|id| format!("http://codebase.example/classes/{id}"))
            .collect();
        prop_assert_eq!(urls, expected);
    }

    #[test]
    fn prop_scripted_reply_decodes_to_encoded_value(ids in prop::collection::vec("\\PC{0,20}", 0..8)) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let delegate = ScriptedDelegate::new(vec![Step::Reply(encoded(&ids))]);
        let stub = CodeBaseStub::with_delegate(delegate.clone());
        let bases = rt.block_on(stub.bases("x")).unwrap();
        prop_assert_eq!(bases, ids);
        prop_assert_eq!(delegate.released(), 1);
    }
}
