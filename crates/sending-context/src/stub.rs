//! Client stub for the CodeBase interface.
//!
//! Every operation follows one template: open a request named after the
//! operation, write the arguments, invoke, read the result. An application
//! exception from the peer becomes `CodeBaseError::Marshal` carrying its id;
//! a remarshal signal sends the request again.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use orb_cdr::{CdrDecode, CdrWriter};

use crate::config::StubConfig;
use crate::delegate::{ApplicationFault, Delegate, InvokeOutcome};
use crate::error::{CodeBaseError, Result};
use crate::interface::{Operation, CODEBASE_IDS};
use crate::types::{
    FullValueDescription, Repository, RepositoryId, RepositoryIdSeq, Url, UrlSeq, ValueDescSeq,
};

/// The operations of `SendingContext::CodeBase`.
///
/// Implemented by [`CodeBaseStub`] on the client side and by servants on
/// the serving side.
#[async_trait]
pub trait CodeBase: Send + Sync {
    /// The interface repository of the sending context.
    async fn get_ir(&self) -> Result<Repository>;

    /// A URL to the implementation code for `x`.
    async fn implementation(&self, x: &str) -> Result<Url>;

    async fn implementations(&self, x: &[RepositoryId]) -> Result<UrlSeq>;

    /// The full description of the value type `x`.
    async fn meta(&self, x: &str) -> Result<FullValueDescription>;

    async fn metas(&self, x: &[RepositoryId]) -> Result<ValueDescSeq>;

    /// The repository ids of the bases of `x`.
    async fn bases(&self, x: &str) -> Result<RepositoryIdSeq>;
}

/// A proxy for a remote CodeBase object.
///
/// A stub created with [`CodeBaseStub::new`] has no delegate and fails
/// every call with `NoDelegate` until [`CodeBaseStub::set_delegate`] is
/// called.
#[derive(Clone, Default)]
pub struct CodeBaseStub {
    delegate: Option<Arc<dyn Delegate>>,
    config: StubConfig,
}

impl CodeBaseStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delegate(delegate: Arc<dyn Delegate>) -> Self {
        Self {
            delegate: Some(delegate),
            config: StubConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StubConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn Delegate>) {
        tracing::debug!(
            type_id = %delegate.object_reference().type_id,
            "binding CodeBase stub to delegate"
        );
        self.delegate = Some(delegate);
    }

    pub fn delegate(&self) -> Result<&Arc<dyn Delegate>> {
        self.delegate.as_ref().ok_or(CodeBaseError::NoDelegate)
    }

    /// Repository ids of every interface this stub implements, most
    /// derived first. Each call returns a fresh vector.
    pub fn ids(&self) -> Vec<String> {
        CODEBASE_IDS.iter().map(|id| id.to_string()).collect()
    }

    /// Whether this stub implements the interface `repository_id`.
    pub fn is_a(&self, repository_id: &str) -> bool {
        CODEBASE_IDS.contains(&repository_id)
    }

    /// Run one operation to completion, re-sending it on every remarshal
    /// signal until the configured limit (if any) is exceeded.
    async fn invoke<T: CdrDecode + Send>(
        &self,
        operation: Operation,
        write_args: &(dyn Fn(&mut CdrWriter) + Sync),
    ) -> Result<T> {
        let delegate = self.delegate()?;
        let mut remarshals: u32 = 0;

        loop {
            let mut request = delegate.request(operation.name(), true);
            write_args(request.writer());

            tracing::trace!(
                "Calling {}() ({} argument bytes)",
                operation.name(),
                request.body().len()
            );

            match delegate.invoke(request).await? {
                InvokeOutcome::Reply(mut stream) => {
                    let result = T::decode(stream.reader());
                    delegate.release_reply(stream);
                    tracing::trace!("{}() returned", operation.name());
                    return Ok(result?);
                }
                InvokeOutcome::Fault(ApplicationFault { id, stream }) => {
                    delegate.release_reply(stream);
                    tracing::warn!(
                        "{}() raised unexpected application exception {id}",
                        operation.name()
                    );
                    return Err(CodeBaseError::Marshal { id });
                }
                InvokeOutcome::Remarshal => {
                    remarshals += 1;
                    if let Some(limit) = self.config.max_remarshals {
                        if remarshals > limit {
                            tracing::warn!(
                                "{}() still asked to remarshal after {limit} retries, giving up",
                                operation.name()
                            );
                            return Err(CodeBaseError::RemarshalLimit(limit));
                        }
                    }
                    tracing::debug!(
                        "{}() remarshal requested (attempt {})",
                        operation.name(),
                        remarshals
                    );
                }
            }
        }
    }
}

impl fmt::Debug for CodeBaseStub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeBaseStub")
            .field(
                "delegate",
                &self.delegate.as_ref().map(|d| d.object_reference().type_id),
            )
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl CodeBase for CodeBaseStub {
    async fn get_ir(&self) -> Result<Repository> {
        self.invoke(Operation::GetIr, &|_| {}).await
    }

    async fn implementation(&self, x: &str) -> Result<Url> {
        self.invoke(Operation::Implementation, &|w| w.write_string(x))
            .await
    }

    async fn implementations(&self, x: &[RepositoryId]) -> Result<UrlSeq> {
        self.invoke(Operation::Implementations, &|w| w.write(x)).await
    }

    async fn meta(&self, x: &str) -> Result<FullValueDescription> {
        self.invoke(Operation::Meta, &|w| w.write_string(x)).await
    }

    async fn metas(&self, x: &[RepositoryId]) -> Result<ValueDescSeq> {
        self.invoke(Operation::Metas, &|w| w.write(x)).await
    }

    async fn bases(&self, x: &str) -> Result<RepositoryIdSeq> {
        self.invoke(Operation::Bases, &|w| w.write_string(x)).await
    }
}
