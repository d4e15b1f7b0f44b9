//! Interoperable Object References and their stringified `IOR:` form.
//!
//! An IOR is a repository id plus a sequence of tagged profiles. The
//! stringified form is `IOR:` followed by the hex encoding of a CDR
//! encapsulation holding the IOR.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::{CdrError, Result};
use crate::marshal::{ByteOrder, CdrDecode, CdrEncode, CdrReader, CdrWriter};

/// Profile tag for IIOP addressing.
pub const TAG_INTERNET_IOP: u32 = 0;
/// Profile tag for a bare component list.
pub const TAG_MULTIPLE_COMPONENTS: u32 = 1;

const IOR_PREFIX: &str = "IOR:";

/// One addressing profile of an object reference. The body is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedProfile {
    pub tag: u32,
    pub data: Bytes,
}

impl TaggedProfile {
    /// Build an IIOP 1.0 profile for `host:port` and the given object key.
    pub fn iiop(host: &str, port: u16, object_key: &[u8]) -> Self {
        let mut w = CdrWriter::new(ByteOrder::Big);
        w.write_octet(ByteOrder::Big.flag());
        // IIOP version 1.0
        w.write_octet(1);
        w.write_octet(0);
        w.write_string(host);
        w.write_ushort(port);
        w.write_octet_seq(object_key);
        Self {
            tag: TAG_INTERNET_IOP,
            data: w.into_bytes(),
        }
    }
}

impl CdrEncode for TaggedProfile {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_ulong(self.tag);
        w.write_octet_seq(&self.data);
    }
}

impl CdrDecode for TaggedProfile {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        Ok(Self {
            tag: r.read_ulong()?,
            data: r.read_octet_seq()?,
        })
    }
}

/// An object reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ior {
    pub type_id: String,
    pub profiles: Vec<TaggedProfile>,
}

impl Ior {
    pub fn new(type_id: impl Into<String>, profiles: Vec<TaggedProfile>) -> Self {
        Self {
            type_id: type_id.into(),
            profiles,
        }
    }

    /// The nil reference: empty type id, no profiles.
    pub fn null() -> Self {
        Self::default()
    }

    pub fn is_null(&self) -> bool {
        self.type_id.is_empty() && self.profiles.is_empty()
    }

    /// Encode as a big-endian encapsulation body (flag octet included).
    pub fn to_encapsulation(&self) -> Bytes {
        let mut w = CdrWriter::new(ByteOrder::Big);
        w.write_octet(ByteOrder::Big.flag());
        w.write(self);
        w.into_bytes()
    }

    /// Decode from an encapsulation body (flag octet included).
    pub fn from_encapsulation(data: Bytes) -> Result<Self> {
        let mut r = CdrReader::from_encapsulation(data)?;
        r.read()
    }
}

impl CdrEncode for Ior {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_string(&self.type_id);
        w.write(&self.profiles);
    }
}

impl CdrDecode for Ior {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        Ok(Self {
            type_id: r.read_string()?,
            profiles: r.read()?,
        })
    }
}

impl fmt::Display for Ior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{IOR_PREFIX}{}", hex::encode(self.to_encapsulation()))
    }
}

impl FromStr for Ior {
    type Err = CdrError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex_part = match s.get(..IOR_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(IOR_PREFIX) => &s[IOR_PREFIX.len()..],
            _ => {
                return Err(CdrError::InvalidIor(format!(
                    "missing {IOR_PREFIX} prefix"
                )))
            }
        };
        let data = hex::decode(hex_part)
            .map_err(|e| CdrError::InvalidIor(format!("bad hex: {e}")))?;
        Ior::from_encapsulation(Bytes::from(data))
    }
}
