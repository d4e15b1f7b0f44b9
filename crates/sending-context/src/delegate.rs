//! The invocation primitive a stub is bound to.
//!
//! A `Delegate` is whatever actually reaches the object: an ORB connection,
//! a collocated servant, or a test double. The stub only ever asks it to
//! open a request, invoke it, and release the reply afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use orb_cdr::{ByteOrder, CdrReader, CdrWriter, Ior};

use crate::error::Result;

/// An outbound request: the operation name plus its marshaled arguments.
#[derive(Debug, Clone)]
pub struct RequestBuffer {
    operation: String,
    response_expected: bool,
    body: CdrWriter,
}

impl RequestBuffer {
    pub fn new(operation: impl Into<String>, response_expected: bool, order: ByteOrder) -> Self {
        Self {
            operation: operation.into(),
            response_expected,
            body: CdrWriter::new(order),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn response_expected(&self) -> bool {
        self.response_expected
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.body.byte_order()
    }

    /// The argument buffer.
    pub fn writer(&mut self) -> &mut CdrWriter {
        &mut self.body
    }

    pub fn body(&self) -> &[u8] {
        self.body.as_bytes()
    }

    pub fn into_parts(self) -> (String, Bytes) {
        (self.operation, self.body.into_bytes())
    }
}

/// An inbound reply body. Must be handed back through
/// [`Delegate::release_reply`] once consumed.
#[derive(Debug)]
pub struct ReplyStream {
    reader: CdrReader,
}

impl ReplyStream {
    pub fn new(reader: CdrReader) -> Self {
        Self { reader }
    }

    pub fn from_bytes(body: Bytes, order: ByteOrder) -> Self {
        Self::new(CdrReader::new(body, order))
    }

    pub fn reader(&mut self) -> &mut CdrReader {
        &mut self.reader
    }

    pub fn into_reader(self) -> CdrReader {
        self.reader
    }
}

/// An application exception raised by the peer.
#[derive(Debug)]
pub struct ApplicationFault {
    /// Repository id of the exception.
    pub id: String,
    /// The reply body, positioned after the id.
    pub stream: ReplyStream,
}

/// What came back from one invocation.
#[derive(Debug)]
pub enum InvokeOutcome {
    Reply(ReplyStream),
    /// The request must be marshaled and sent again, typically because the
    /// object moved. No reply stream was opened.
    Remarshal,
    Fault(ApplicationFault),
}

/// The runtime side of a remote object reference.
#[async_trait]
pub trait Delegate: Send + Sync {
    /// Open a request for `operation`.
    fn request(&self, operation: &str, response_expected: bool) -> RequestBuffer {
        RequestBuffer::new(operation, response_expected, ByteOrder::Big)
    }

    /// Send the request and wait for the outcome. Transport failures are
    /// `Err`; everything the peer said is an `InvokeOutcome`.
    async fn invoke(&self, request: RequestBuffer) -> Result<InvokeOutcome>;

    /// Give back a reply stream obtained from `invoke`.
    fn release_reply(&self, reply: ReplyStream) {
        drop(reply);
    }

    /// The object reference this delegate reaches.
    fn object_reference(&self) -> Ior;
}

/// Turns a stringified object reference back into a delegate.
pub trait ObjectResolver: Send + Sync {
    fn string_to_delegate(&self, reference: &str) -> Result<Arc<dyn Delegate>>;
}
