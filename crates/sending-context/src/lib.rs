//! Client stub for the CORBA `SendingContext::CodeBase` interface.
//!
//! A CodeBase object lets the receiver of a value type ask the sender
//! where the implementation lives (`implementation`), what the value looks
//! like (`meta`), and what it derives from (`bases`). This crate exposes
//! those operations as a typed async trait, `CodeBase`, and implements it
//! with `CodeBaseStub`, which marshals each call through a pluggable
//! [`Delegate`].
//!
//! # Architecture
//!
//! ```text
//! Your code
//!     └── CodeBaseStub (stub.rs)          typed operations, remarshal loop
//!           └── dyn Delegate (delegate.rs) open / invoke / release
//!                 ├── an ORB connection (not part of this crate)
//!                 └── ServantDelegate (servant.rs) collocated CodeBase
//! ```
//!
//! Payload types and their CDR helpers live in `types.rs`; the wire-level
//! encoding comes from the `orb-cdr` crate. A stub can be persisted as its
//! stringified object reference (`persist.rs`) and restored through any
//! [`ObjectResolver`], such as the in-process [`LocalOrb`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sending_context::{CodeBase, CodeBaseStub, Delegate};
//!
//! # async fn example(delegate: Arc<dyn Delegate>) -> sending_context::Result<()> {
//! let stub = CodeBaseStub::with_delegate(delegate);
//! let url = stub.implementation("RMI:com.example.Point:0000000000000001").await?;
//! let bases = stub.bases("RMI:com.example.Point:0000000000000001").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod delegate;
pub mod error;
pub mod interface;
pub mod orb;
pub mod persist;
pub mod servant;
pub mod stub;
pub mod types;

// Re-export key types
pub use config::StubConfig;
pub use delegate::{
    ApplicationFault, Delegate, InvokeOutcome, ObjectResolver, ReplyStream, RequestBuffer,
};
pub use error::{CodeBaseError, Result};
pub use interface::{Operation, CODEBASE_ID, CODEBASE_IDS, RUNTIME_ID};
pub use orb::LocalOrb;
pub use servant::ServantDelegate;
pub use stub::{CodeBase, CodeBaseStub};
pub use types::{FullValueDescription, Repository};
