//! Collocated dispatch: a `Delegate` that serves requests from a local
//! `CodeBase` implementation.
//!
//! Arguments and results still go through the CDR helpers, so a stub bound
//! to a `ServantDelegate` exercises the same encoding as one bound to a
//! remote peer.

use std::sync::Arc;

use async_trait::async_trait;
use orb_cdr::{ByteOrder, CdrReader, CdrWriter, Ior};

use crate::delegate::{ApplicationFault, Delegate, InvokeOutcome, ReplyStream, RequestBuffer};
use crate::error::{CodeBaseError, Result};
use crate::interface::Operation;
use crate::stub::CodeBase;
use crate::types::RepositoryIdSeq;

/// Serves a CodeBase servant in-process.
pub struct ServantDelegate<S> {
    servant: Arc<S>,
    reference: Ior,
    order: ByteOrder,
}

impl<S: CodeBase + 'static> ServantDelegate<S> {
    pub fn new(servant: Arc<S>, reference: Ior) -> Self {
        Self {
            servant,
            reference,
            order: ByteOrder::Big,
        }
    }

    /// Marshal requests and replies in `order` instead of big-endian.
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    /// Decode the arguments of `operation`, call the servant and encode its
    /// result into `reply`.
    async fn dispatch(
        &self,
        operation: Operation,
        args: &mut CdrReader,
        reply: &mut CdrWriter,
    ) -> Result<()> {
        let servant = self.servant.as_ref();
        match operation {
            Operation::GetIr => reply.write(&servant.get_ir().await?),
            Operation::Implementation => {
                let x = args.read_string()?;
                reply.write(&servant.implementation(&x).await?);
            }
            Operation::Implementations => {
                let x: RepositoryIdSeq = args.read()?;
                reply.write(&servant.implementations(&x).await?);
            }
            Operation::Meta => {
                let x = args.read_string()?;
                reply.write(&servant.meta(&x).await?);
            }
            Operation::Metas => {
                let x: RepositoryIdSeq = args.read()?;
                reply.write(&servant.metas(&x).await?);
            }
            Operation::Bases => {
                let x = args.read_string()?;
                reply.write(&servant.bases(&x).await?);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<S: CodeBase + 'static> Delegate for ServantDelegate<S> {
    fn request(&self, operation: &str, response_expected: bool) -> RequestBuffer {
        RequestBuffer::new(operation, response_expected, self.order)
    }

    async fn invoke(&self, request: RequestBuffer) -> Result<InvokeOutcome> {
        let order = request.byte_order();
        let (name, body) = request.into_parts();
        let operation =
            Operation::from_name(&name).ok_or_else(|| CodeBaseError::BadOperation(name.clone()))?;

        tracing::trace!("Dispatching {name}() to collocated servant");

        let mut args = CdrReader::new(body, order);
        let mut reply = CdrWriter::new(order);
        match self.dispatch(operation, &mut args, &mut reply).await {
            Ok(()) => Ok(InvokeOutcome::Reply(ReplyStream::from_bytes(
                reply.into_bytes(),
                order,
            ))),
            Err(CodeBaseError::Application { id }) => {
                // The reply body of an application exception starts with its id.
                let mut body = CdrWriter::new(order);
                body.write_string(&id);
                let mut stream = ReplyStream::from_bytes(body.into_bytes(), order);
                stream.reader().read_string()?;
                Ok(InvokeOutcome::Fault(ApplicationFault { id, stream }))
            }
            Err(e) => Err(e),
        }
    }

    fn object_reference(&self) -> Ior {
        self.reference.clone()
    }
}
