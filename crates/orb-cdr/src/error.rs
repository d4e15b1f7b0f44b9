//! Error types for CDR marshaling.

use thiserror::Error;

/// Errors that can occur while encoding or decoding CDR data.
#[derive(Debug, Error)]
pub enum CdrError {
    #[error("unexpected end of data reading {what}: need {needed} bytes, have {remaining}")]
    UnexpectedEof {
        what: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid string: {0}")]
    InvalidString(String),

    #[error("Invalid boolean octet: {0:#04x}")]
    InvalidBoolean(u8),

    #[error("Invalid byte order flag: {0:#04x}")]
    BadEncapsulation(u8),

    #[error("Sequence of {count} elements cannot fit in {remaining} remaining bytes")]
    SequenceTooLong { count: u32, remaining: usize },

    #[error("Unsupported TypeCode kind: {0:#x}")]
    UnsupportedTypeCode(u32),

    #[error("Invalid {what} discriminant: {value}")]
    InvalidEnum { what: &'static str, value: u32 },

    #[error("Invalid object reference: {0}")]
    InvalidIor(String),
}

pub type Result<T> = std::result::Result<T, CdrError>;
