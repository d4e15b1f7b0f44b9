//! Persistence of a stub as its stringified object reference.
//!
//! The stored form is a single `writeUTF`-style field: a big-endian `u16`
//! byte count followed by the text in modified UTF-8 (NUL as `C0 80`,
//! supplementary characters as encoded surrogate pairs). Stringified IORs
//! are plain ASCII, but the full encoding is kept so streams written by
//! other runtimes read back unchanged.

use std::io::{self, Read, Write};

use crate::delegate::ObjectResolver;
use crate::error::Result;
use crate::stub::CodeBaseStub;

impl CodeBaseStub {
    /// Write this stub's object reference to `w`.
    pub fn write_object<W: Write>(&self, w: &mut W) -> Result<()> {
        let reference = self.delegate()?.object_reference().to_string();
        write_utf(w, &reference)?;
        Ok(())
    }

    /// Read an object reference written by [`CodeBaseStub::write_object`]
    /// and bind a new stub to the delegate `resolver` finds for it.
    pub fn read_object<R: Read>(r: &mut R, resolver: &dyn ObjectResolver) -> Result<Self> {
        let reference = read_utf(r)?;
        let delegate = resolver.string_to_delegate(&reference)?;
        tracing::info!("Restored CodeBase stub from {} byte reference", reference.len());
        Ok(CodeBaseStub::with_delegate(delegate))
    }
}

/// Write `s` as a length-prefixed modified UTF-8 field.
pub fn write_utf<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    let mut encoded = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => encoded.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                encoded.push(0xC0 | (unit >> 6) as u8);
                encoded.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                encoded.push(0xE0 | (unit >> 12) as u8);
                encoded.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                encoded.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }

    let len = u16::try_from(encoded.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("encoded string too long: {} bytes", encoded.len()),
        )
    })?;
    w.write_all(&len.to_be_bytes())?;
    w.write_all(&encoded)
}

/// Read a length-prefixed modified UTF-8 field.
pub fn read_utf<R: Read>(r: &mut R) -> io::Result<String> {
    let mut len = [0u8; 2];
    r.read_exact(&mut len)?;
    let mut data = vec![0u8; u16::from_be_bytes(len) as usize];
    r.read_exact(&mut data)?;

    let malformed = |at: usize| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed modified UTF-8 at byte {at}"),
        )
    };

    let mut units = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        let continuation = |k: usize| match data.get(i + k) {
            Some(&c) if c & 0xC0 == 0x80 => Ok((c & 0x3F) as u16),
            _ => Err(malformed(i)),
        };
        match b >> 4 {
            0x0..=0x7 => {
                units.push(b as u16);
                i += 1;
            }
            0xC | 0xD => {
                units.push(((b & 0x1F) as u16) << 6 | continuation(1)?);
                i += 2;
            }
            0xE => {
                units.push(((b & 0x0F) as u16) << 12 | continuation(1)? << 6 | continuation(2)?);
                i += 3;
            }
            _ => return Err(malformed(i)),
        }
    }

    String::from_utf16(&units).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
