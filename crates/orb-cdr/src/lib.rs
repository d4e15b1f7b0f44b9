//! CORBA Common Data Representation (CDR) for Rust.
//!
//! This crate holds the marshaling layer that IDL stubs are written against:
//!
//! - **Marshal** (`marshal.rs`): aligned, byte-order aware reader/writer and
//!   the `CdrEncode` / `CdrDecode` helper traits
//! - **TypeCode** (`typecode.rs`): TypeCode values as carried in value
//!   descriptions
//! - **IOR** (`ior.rs`): object references and their stringified `IOR:` form
//!
//! # Example
//!
//! ```rust
//! use orb_cdr::{ByteOrder, CdrReader, CdrWriter};
//!
//! let mut w = CdrWriter::new(ByteOrder::Big);
//! w.write_string("IDL:omg.org/SendingContext/CodeBase:1.0");
//! w.write_ulong(7);
//!
//! let mut r = CdrReader::new(w.into_bytes(), ByteOrder::Big);
//! assert_eq!(r.read_string().unwrap(), "IDL:omg.org/SendingContext/CodeBase:1.0");
//! assert_eq!(r.read_ulong().unwrap(), 7);
//! ```

pub mod error;
pub mod ior;
pub mod marshal;
pub mod typecode;

// Re-export key types
pub use error::{CdrError, Result};
pub use ior::{Ior, TaggedProfile};
pub use marshal::{ByteOrder, CdrDecode, CdrEncode, CdrReader, CdrWriter};
pub use typecode::{TcKind, TypeCode};
