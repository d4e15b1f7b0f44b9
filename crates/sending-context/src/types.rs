//! Payload types of the CodeBase interface and their marshaling helpers.
//!
//! These mirror the interface repository declarations the operations use:
//! repository ids, URLs, the `Repository` reference returned by `get_ir`,
//! and `FullValueDescription` with its nested records. Struct members are
//! written in IDL declaration order with no tags or padding beyond CDR
//! alignment.

use orb_cdr::{CdrDecode, CdrEncode, CdrError, CdrReader, CdrWriter, Ior, Result, TypeCode};

pub type RepositoryId = String;
pub type Url = String;
pub type Identifier = String;
pub type VersionSpec = String;
pub type RepositoryIdSeq = Vec<RepositoryId>;
pub type UrlSeq = Vec<Url>;
pub type ContextIdSeq = Vec<String>;
pub type ValueDescSeq = Vec<FullValueDescription>;

/// An `IDLType` object reference.
pub type IdlType = Ior;

/// `ValueMember::access` for a private state member.
pub const PRIVATE_MEMBER: i16 = 0;
/// `ValueMember::access` for a public state member.
pub const PUBLIC_MEMBER: i16 = 1;

/// Generate the encode/decode pair for a record whose members all have
/// helpers of their own. Members are marshaled in the order listed.
macro_rules! cdr_struct {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl CdrEncode for $ty {
            fn encode(&self, w: &mut CdrWriter) {
                $( w.write(&self.$field); )+
            }
        }

        impl CdrDecode for $ty {
            fn decode(r: &mut CdrReader) -> Result<Self> {
                Ok(Self {
                    $( $field: r.read()?, )+
                })
            }
        }
    };
}

/// Generate the encode/decode pair for an IDL enum (a `ulong` on the wire).
macro_rules! cdr_enum {
    ($ty:ident, $what:literal { $($variant:ident = $value:literal),+ $(,)? }) => {
        impl CdrEncode for $ty {
            fn encode(&self, w: &mut CdrWriter) {
                w.write_ulong(*self as u32);
            }
        }

        impl CdrDecode for $ty {
            fn decode(r: &mut CdrReader) -> Result<Self> {
                match r.read_ulong()? {
                    $( $value => Ok($ty::$variant), )+
                    value => Err(CdrError::InvalidEnum { what: $what, value }),
                }
            }
        }
    };
}

// ============================================================================
// Repository
// ============================================================================

/// Reference to an interface repository. May be nil.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Repository(pub Ior);

impl Repository {
    pub fn ior(&self) -> &Ior {
        &self.0
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_null()
    }
}

impl CdrEncode for Repository {
    fn encode(&self, w: &mut CdrWriter) {
        w.write(&self.0);
    }
}

impl CdrDecode for Repository {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        Ok(Repository(r.read()?))
    }
}

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum OperationMode {
    #[default]
    Normal = 0,
    Oneway = 1,
}

cdr_enum!(OperationMode, "OperationMode" { Normal = 0, Oneway = 1 });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ParameterMode {
    #[default]
    In = 0,
    Out = 1,
    InOut = 2,
}

cdr_enum!(ParameterMode, "ParameterMode" { In = 0, Out = 1, InOut = 2 });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum AttributeMode {
    #[default]
    Normal = 0,
    ReadOnly = 1,
}

cdr_enum!(AttributeMode, "AttributeMode" { Normal = 0, ReadOnly = 1 });

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterDescription {
    pub name: Identifier,
    pub type_code: TypeCode,
    pub type_def: IdlType,
    pub mode: ParameterMode,
}

cdr_struct!(ParameterDescription { name, type_code, type_def, mode });

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExceptionDescription {
    pub name: Identifier,
    pub id: RepositoryId,
    pub defined_in: RepositoryId,
    pub version: VersionSpec,
    pub type_code: TypeCode,
}

cdr_struct!(ExceptionDescription { name, id, defined_in, version, type_code });

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperationDescription {
    pub name: Identifier,
    pub id: RepositoryId,
    pub defined_in: RepositoryId,
    pub version: VersionSpec,
    pub result: TypeCode,
    pub mode: OperationMode,
    pub contexts: ContextIdSeq,
    pub parameters: Vec<ParameterDescription>,
    pub exceptions: Vec<ExceptionDescription>,
}

cdr_struct!(OperationDescription {
    name,
    id,
    defined_in,
    version,
    result,
    mode,
    contexts,
    parameters,
    exceptions,
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeDescription {
    pub name: Identifier,
    pub id: RepositoryId,
    pub defined_in: RepositoryId,
    pub version: VersionSpec,
    pub type_code: TypeCode,
    pub mode: AttributeMode,
}

cdr_struct!(AttributeDescription { name, id, defined_in, version, type_code, mode });

/// A state member of a value type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueMember {
    pub name: Identifier,
    pub id: RepositoryId,
    pub defined_in: RepositoryId,
    pub version: VersionSpec,
    pub type_code: TypeCode,
    pub type_def: IdlType,
    /// `PRIVATE_MEMBER` or `PUBLIC_MEMBER`.
    pub access: i16,
}

cdr_struct!(ValueMember {
    name,
    id,
    defined_in,
    version,
    type_code,
    type_def,
    access,
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructMember {
    pub name: Identifier,
    pub type_code: TypeCode,
    pub type_def: IdlType,
}

cdr_struct!(StructMember { name, type_code, type_def });

/// A value type factory (constructor) declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Initializer {
    pub members: Vec<StructMember>,
    pub name: Identifier,
}

cdr_struct!(Initializer { members, name });

/// Everything the receiving side needs to know about a value type it has
/// no local implementation for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FullValueDescription {
    pub name: Identifier,
    pub id: RepositoryId,
    pub is_abstract: bool,
    pub is_custom: bool,
    pub defined_in: RepositoryId,
    pub version: VersionSpec,
    pub operations: Vec<OperationDescription>,
    pub attributes: Vec<AttributeDescription>,
    pub members: Vec<ValueMember>,
    pub initializers: Vec<Initializer>,
    pub supported_interfaces: RepositoryIdSeq,
    pub abstract_base_values: RepositoryIdSeq,
    pub is_truncatable: bool,
    pub base_value: RepositoryId,
    pub type_code: TypeCode,
}

cdr_struct!(FullValueDescription {
    name,
    id,
    is_abstract,
    is_custom,
    defined_in,
    version,
    operations,
    attributes,
    members,
    initializers,
    supported_interfaces,
    abstract_base_values,
    is_truncatable,
    base_value,
    type_code,
});
