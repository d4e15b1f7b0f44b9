//! Error types for the CodeBase stub.

use orb_cdr::CdrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeBaseError {
    /// The peer answered with an application exception. CodeBase declares
    /// none, so the stub reports it as a marshaling mismatch carrying the
    /// exception's repository id.
    #[error("MARSHAL: unexpected application exception {id}")]
    Marshal { id: String },

    /// Raised by a servant to send an application exception with this id.
    #[error("Application exception: {id}")]
    Application { id: String },

    #[error("CDR error: {0}")]
    Cdr(#[from] CdrError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Object not connected: no delegate set")]
    NoDelegate,

    #[error("Gave up after {0} remarshal requests")]
    RemarshalLimit(u32),

    #[error("Unknown operation: {0}")]
    BadOperation(String),

    #[error("Cannot resolve object reference: {0}")]
    Unresolvable(String),

    #[error("Persistence I/O error: {0}")]
    Persistence(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodeBaseError>;
