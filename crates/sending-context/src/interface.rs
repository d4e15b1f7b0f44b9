//! The CodeBase interface: repository ids and the operation table.
//!
//! CodeBase derives from RunTime, which declares no operations, so every
//! operation below belongs to CodeBase itself.

/// Repository id of `SendingContext::CodeBase`.
pub const CODEBASE_ID: &str = "IDL:omg.org/SendingContext/CodeBase:1.0";
/// Repository id of `SendingContext::RunTime`, the base interface.
pub const RUNTIME_ID: &str = "IDL:omg.org/SendingContext/RunTime:1.0";

/// Every interface a CodeBase object implements, most derived first.
pub const CODEBASE_IDS: [&str; 2] = [CODEBASE_ID, RUNTIME_ID];

/// An operation of the CodeBase interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Obtain the interface repository of the sending context.
    GetIr,
    /// URL of the implementation code for one repository id.
    Implementation,
    Implementations,
    /// Full value description for one repository id.
    Meta,
    Metas,
    /// Repository ids of the bases of a value type.
    Bases,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::GetIr,
        Operation::Implementation,
        Operation::Implementations,
        Operation::Meta,
        Operation::Metas,
        Operation::Bases,
    ];

    /// The operation name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Operation::GetIr => "get_ir",
            Operation::Implementation => "implementation",
            Operation::Implementations => "implementations",
            Operation::Meta => "meta",
            Operation::Metas => "metas",
            Operation::Bases => "bases",
        }
    }

    pub fn from_name(name: &str) -> Option<Operation> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}
