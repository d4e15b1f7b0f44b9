//! IDL TypeCodes as they appear in CDR streams.
//!
//! A TypeCode is a `ulong` kind followed by its parameters. Simple kinds
//! have none; `tk_string` and `tk_wstring` carry a `ulong` bound; every
//! other kind carries its parameters in an encapsulation. Complex
//! parameters are kept as the raw encapsulation body so a TypeCode can be
//! passed through without interpreting it.

use bytes::Bytes;

use crate::error::{CdrError, Result};
use crate::marshal::{ByteOrder, CdrDecode, CdrEncode, CdrReader, CdrWriter};

/// Marker for an indirected TypeCode; not supported by this decoder.
const TC_INDIRECTION: u32 = 0xFFFF_FFFF;

/// TCKind: identifies the kind of a TypeCode.
/// Values match the wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TcKind {
    Null = 0,
    Void = 1,
    Short = 2,
    Long = 3,
    UShort = 4,
    ULong = 5,
    Float = 6,
    Double = 7,
    Boolean = 8,
    Char = 9,
    Octet = 10,
    Any = 11,
    TypeCode = 12,
    Principal = 13,
    ObjRef = 14,
    Struct = 15,
    Union = 16,
    Enum = 17,
    String = 18,
    Sequence = 19,
    Array = 20,
    Alias = 21,
    Except = 22,
    LongLong = 23,
    ULongLong = 24,
    LongDouble = 25,
    WChar = 26,
    WString = 27,
    Fixed = 28,
    Value = 29,
    ValueBox = 30,
    Native = 31,
    AbstractInterface = 32,
    LocalInterface = 33,
}

impl TcKind {
    /// Parse from the wire value.
    pub fn from_u32(v: u32) -> Option<TcKind> {
        use TcKind::*;
        const ALL: [TcKind; 34] = [
            Null, Void, Short, Long, UShort, ULong, Float, Double, Boolean, Char, Octet, Any,
            TypeCode, Principal, ObjRef, Struct, Union, Enum, String, Sequence, Array, Alias,
            Except, LongLong, ULongLong, LongDouble, WChar, WString, Fixed, Value, ValueBox,
            Native, AbstractInterface, LocalInterface,
        ];
        ALL.get(v as usize).copied()
    }

    /// Kinds with no parameters on the wire.
    pub fn is_simple(self) -> bool {
        matches!(
            self,
            TcKind::Null
                | TcKind::Void
                | TcKind::Short
                | TcKind::Long
                | TcKind::UShort
                | TcKind::ULong
                | TcKind::Float
                | TcKind::Double
                | TcKind::Boolean
                | TcKind::Char
                | TcKind::Octet
                | TcKind::Any
                | TcKind::TypeCode
                | TcKind::Principal
                | TcKind::LongLong
                | TcKind::ULongLong
                | TcKind::LongDouble
                | TcKind::WChar
        )
    }

    /// Kinds whose only parameter is a `ulong` bound.
    pub fn is_bounded(self) -> bool {
        matches!(self, TcKind::String | TcKind::WString)
    }
}

/// A TypeCode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCode {
    Simple(TcKind),
    /// `tk_string` / `tk_wstring`; a bound of 0 means unbounded.
    Bounded { kind: TcKind, bound: u32 },
    /// Any kind with encapsulated parameters. `params` is the full
    /// encapsulation, byte order flag included.
    Complex { kind: TcKind, params: Bytes },
}

impl TypeCode {
    pub fn null() -> Self {
        TypeCode::Simple(TcKind::Null)
    }

    pub fn kind(&self) -> TcKind {
        match self {
            TypeCode::Simple(kind) => *kind,
            TypeCode::Bounded { kind, .. } => *kind,
            TypeCode::Complex { kind, .. } => *kind,
        }
    }

    /// An unbounded string TypeCode.
    pub fn string() -> Self {
        TypeCode::Bounded {
            kind: TcKind::String,
            bound: 0,
        }
    }

    /// `tk_objref` with the given repository id and name.
    pub fn objref(id: &str, name: &str) -> Self {
        Self::complex(TcKind::ObjRef, |w| {
            w.write_string(id);
            w.write_string(name);
        })
    }

    /// `tk_value` for a concrete valuetype with no base and no members.
    pub fn value(id: &str, name: &str) -> Self {
        Self::complex(TcKind::Value, |w| {
            w.write_string(id);
            w.write_string(name);
            // ValueModifier VM_NONE
            w.write_short(0);
            // concrete base: tk_null
            w.write_ulong(TcKind::Null as u32);
            // member count
            w.write_ulong(0);
        })
    }

    fn complex(kind: TcKind, body: impl FnOnce(&mut CdrWriter)) -> Self {
        let mut w = CdrWriter::new(ByteOrder::Big);
        w.write_octet(ByteOrder::Big.flag());
        body(&mut w);
        TypeCode::Complex {
            kind,
            params: w.into_bytes(),
        }
    }

    /// The repository id of an objref/struct/value/... TypeCode, read from
    /// the first parameter of its encapsulation.
    pub fn id(&self) -> Result<Option<String>> {
        match self {
            TypeCode::Complex { kind, params } if has_id(*kind) => {
                let mut r = CdrReader::from_encapsulation(params.clone())?;
                Ok(Some(r.read_string()?))
            }
            _ => Ok(None),
        }
    }
}

impl Default for TypeCode {
    fn default() -> Self {
        TypeCode::null()
    }
}

fn has_id(kind: TcKind) -> bool {
    matches!(
        kind,
        TcKind::ObjRef
            | TcKind::Struct
            | TcKind::Union
            | TcKind::Enum
            | TcKind::Alias
            | TcKind::Except
            | TcKind::Value
            | TcKind::ValueBox
            | TcKind::Native
            | TcKind::AbstractInterface
            | TcKind::LocalInterface
    )
}

impl CdrEncode for TypeCode {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_ulong(self.kind() as u32);
        match self {
            TypeCode::Simple(_) => {}
            TypeCode::Bounded { bound, .. } => w.write_ulong(*bound),
            TypeCode::Complex { params, .. } => w.write_octet_seq(params),
        }
    }
}

impl CdrDecode for TypeCode {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        let raw = r.read_ulong()?;
        if raw == TC_INDIRECTION {
            return Err(CdrError::UnsupportedTypeCode(raw));
        }
        let kind = match TcKind::from_u32(raw) {
            // tk_fixed carries digits/scale rather than an encapsulation
            Some(TcKind::Fixed) | None => return Err(CdrError::UnsupportedTypeCode(raw)),
            Some(kind) => kind,
        };

        if kind.is_simple() {
            Ok(TypeCode::Simple(kind))
        } else if kind.is_bounded() {
            Ok(TypeCode::Bounded {
                kind,
                bound: r.read_ulong()?,
            })
        } else {
            let params = r.read_octet_seq()?;
            CdrReader::from_encapsulation(params.clone())?;
            Ok(TypeCode::Complex { kind, params })
        }
    }
}
