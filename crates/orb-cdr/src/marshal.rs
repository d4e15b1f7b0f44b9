//! Binary serialization/deserialization of IDL types in the CDR wire format.
//!
//! Primitive values are aligned on their natural size, measured from the
//! start of the stream (or of the enclosing encapsulation). Padding is zero
//! on write and skipped on read. Strings carry a `ulong` length that counts
//! the terminating NUL. Sequences are a `ulong` element count followed by
//! the elements.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CdrError, Result};

// ============================================================================
// Byte order
// ============================================================================

/// Byte order of a CDR stream. Encapsulations record it in their first octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

impl ByteOrder {
    /// The encapsulation flag octet for this byte order.
    pub fn flag(self) -> u8 {
        match self {
            ByteOrder::Big => 0,
            ByteOrder::Little => 1,
        }
    }

    /// Parse an encapsulation flag octet.
    pub fn from_flag(flag: u8) -> Result<Self> {
        match flag {
            0 => Ok(ByteOrder::Big),
            1 => Ok(ByteOrder::Little),
            other => Err(CdrError::BadEncapsulation(other)),
        }
    }
}

// ============================================================================
// Marshaling helper traits
// ============================================================================

/// The write half of a marshaling helper.
pub trait CdrEncode {
    fn encode(&self, w: &mut CdrWriter);
}

/// The read half of a marshaling helper.
pub trait CdrDecode: Sized {
    fn decode(r: &mut CdrReader) -> Result<Self>;
}

// ============================================================================
// Writer
// ============================================================================

/// An outbound CDR buffer.
#[derive(Debug, Clone)]
pub struct CdrWriter {
    buf: BytesMut,
    order: ByteOrder,
}

impl CdrWriter {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
            order,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    fn align(&mut self, size: usize) {
        let pad = (size - self.buf.len() % size) % size;
        self.buf.put_bytes(0, pad);
    }

    /// Write any value that has a marshaling helper.
    pub fn write<T: CdrEncode + ?Sized>(&mut self, value: &T) {
        value.encode(self);
    }

    pub fn write_octet(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn write_boolean(&mut self, v: bool) {
        self.buf.put_u8(u8::from(v));
    }

    pub fn write_short(&mut self, v: i16) {
        self.align(2);
        match self.order {
            ByteOrder::Big => self.buf.put_i16(v),
            ByteOrder::Little => self.buf.put_i16_le(v),
        }
    }

    pub fn write_ushort(&mut self, v: u16) {
        self.align(2);
        match self.order {
            ByteOrder::Big => self.buf.put_u16(v),
            ByteOrder::Little => self.buf.put_u16_le(v),
        }
    }

    pub fn write_long(&mut self, v: i32) {
        self.align(4);
        match self.order {
            ByteOrder::Big => self.buf.put_i32(v),
            ByteOrder::Little => self.buf.put_i32_le(v),
        }
    }

    pub fn write_ulong(&mut self, v: u32) {
        self.align(4);
        match self.order {
            ByteOrder::Big => self.buf.put_u32(v),
            ByteOrder::Little => self.buf.put_u32_le(v),
        }
    }

    pub fn write_longlong(&mut self, v: i64) {
        self.align(8);
        match self.order {
            ByteOrder::Big => self.buf.put_i64(v),
            ByteOrder::Little => self.buf.put_i64_le(v),
        }
    }

    pub fn write_ulonglong(&mut self, v: u64) {
        self.align(8);
        match self.order {
            ByteOrder::Big => self.buf.put_u64(v),
            ByteOrder::Little => self.buf.put_u64_le(v),
        }
    }

    /// Write a string: `ulong` length including the NUL, bytes, NUL.
    pub fn write_string(&mut self, s: &str) {
        self.write_ulong(s.len() as u32 + 1);
        self.buf.put_slice(s.as_bytes());
        self.buf.put_u8(0);
    }

    pub fn write_octet_seq(&mut self, data: &[u8]) {
        self.write_ulong(data.len() as u32);
        self.buf.put_slice(data);
    }

    /// Write the element count that starts a sequence.
    pub fn write_seq_len(&mut self, len: usize) {
        self.write_ulong(len as u32);
    }

    /// Write an encapsulation: a nested stream with its own byte order flag
    /// and alignment origin, embedded as an octet sequence.
    pub fn write_encapsulation(&mut self, order: ByteOrder, body: impl FnOnce(&mut CdrWriter)) {
        let mut inner = CdrWriter::new(order);
        inner.write_octet(order.flag());
        body(&mut inner);
        self.write_octet_seq(&inner.buf);
    }
}

// ============================================================================
// Reader
// ============================================================================

/// An inbound CDR buffer.
#[derive(Debug, Clone)]
pub struct CdrReader {
    buf: Bytes,
    /// Bytes consumed so far; alignment is measured from here.
    consumed: usize,
    order: ByteOrder,
}

impl CdrReader {
    pub fn new(buf: Bytes, order: ByteOrder) -> Self {
        Self {
            buf,
            consumed: 0,
            order,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The unread bytes.
    pub fn into_remaining(self) -> Bytes {
        self.buf
    }

    fn ensure(&self, needed: usize, what: &'static str) -> Result<()> {
        if self.buf.remaining() < needed {
            Err(CdrError::UnexpectedEof {
                what,
                needed,
                remaining: self.buf.remaining(),
            })
        } else {
            Ok(())
        }
    }

    fn skip(&mut self, n: usize) {
        self.buf.advance(n);
        self.consumed += n;
    }

    fn align(&mut self, size: usize, what: &'static str) -> Result<()> {
        let pad = (size - self.consumed % size) % size;
        self.ensure(pad + size, what)?;
        self.skip(pad);
        Ok(())
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<Bytes> {
        self.ensure(n, what)?;
        self.consumed += n;
        Ok(self.buf.split_to(n))
    }

    /// Read any value that has a marshaling helper.
    pub fn read<T: CdrDecode>(&mut self) -> Result<T> {
        T::decode(self)
    }

    pub fn read_octet(&mut self) -> Result<u8> {
        self.ensure(1, "octet")?;
        self.consumed += 1;
        Ok(self.buf.get_u8())
    }

    pub fn read_boolean(&mut self) -> Result<bool> {
        self.ensure(1, "boolean")?;
        self.consumed += 1;
        match self.buf.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CdrError::InvalidBoolean(other)),
        }
    }

    pub fn read_short(&mut self) -> Result<i16> {
        self.align(2, "short")?;
        self.consumed += 2;
        Ok(match self.order {
            ByteOrder::Big => self.buf.get_i16(),
            ByteOrder::Little => self.buf.get_i16_le(),
        })
    }

    pub fn read_ushort(&mut self) -> Result<u16> {
        self.align(2, "unsigned short")?;
        self.consumed += 2;
        Ok(match self.order {
            ByteOrder::Big => self.buf.get_u16(),
            ByteOrder::Little => self.buf.get_u16_le(),
        })
    }

    pub fn read_long(&mut self) -> Result<i32> {
        self.align(4, "long")?;
        self.consumed += 4;
        Ok(match self.order {
            ByteOrder::Big => self.buf.get_i32(),
            ByteOrder::Little => self.buf.get_i32_le(),
        })
    }

    pub fn read_ulong(&mut self) -> Result<u32> {
        self.align(4, "unsigned long")?;
        self.consumed += 4;
        Ok(match self.order {
            ByteOrder::Big => self.buf.get_u32(),
            ByteOrder::Little => self.buf.get_u32_le(),
        })
    }

    pub fn read_longlong(&mut self) -> Result<i64> {
        self.align(8, "long long")?;
        self.consumed += 8;
        Ok(match self.order {
            ByteOrder::Big => self.buf.get_i64(),
            ByteOrder::Little => self.buf.get_i64_le(),
        })
    }

    pub fn read_ulonglong(&mut self) -> Result<u64> {
        self.align(8, "unsigned long long")?;
        self.consumed += 8;
        Ok(match self.order {
            ByteOrder::Big => self.buf.get_u64(),
            ByteOrder::Little => self.buf.get_u64_le(),
        })
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_ulong()? as usize;
        if len == 0 {
            return Err(CdrError::InvalidString("zero length".into()));
        }
        let bytes = self.take(len, "string")?;
        let (terminator, body) = match bytes.split_last() {
            Some((t, body)) => (*t, body),
            None => return Err(CdrError::InvalidString("zero length".into())),
        };
        if terminator != 0 {
            return Err(CdrError::InvalidString("missing NUL terminator".into()));
        }
        String::from_utf8(body.to_vec())
            .map_err(|e| CdrError::InvalidString(format!("invalid UTF-8: {e}")))
    }

    pub fn read_octet_seq(&mut self) -> Result<Bytes> {
        let len = self.read_ulong()? as usize;
        self.take(len, "octet sequence")
    }

    /// Read a sequence element count, rejecting counts the remaining input
    /// cannot possibly hold.
    pub fn read_seq_len(&mut self) -> Result<usize> {
        let count = self.read_ulong()?;
        if count as usize > self.buf.remaining() {
            return Err(CdrError::SequenceTooLong {
                count,
                remaining: self.buf.remaining(),
            });
        }
        Ok(count as usize)
    }

    /// Read an encapsulation and return a reader positioned after its byte
    /// order flag.
    pub fn read_encapsulation(&mut self) -> Result<CdrReader> {
        let data = self.read_octet_seq()?;
        CdrReader::from_encapsulation(data)
    }

    /// Open a reader over an encapsulation body, flag octet included.
    pub fn from_encapsulation(data: Bytes) -> Result<CdrReader> {
        let mut inner = CdrReader::new(data, ByteOrder::Big);
        inner.order = ByteOrder::from_flag(inner.read_octet()?)?;
        Ok(inner)
    }
}

// ============================================================================
// Helpers for the basic types
// ============================================================================

impl CdrEncode for str {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_string(self);
    }
}

impl CdrEncode for String {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_string(self);
    }
}

impl CdrDecode for String {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        r.read_string()
    }
}

impl CdrEncode for bool {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_boolean(*self);
    }
}

impl CdrDecode for bool {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        r.read_boolean()
    }
}

impl CdrEncode for i16 {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_short(*self);
    }
}

impl CdrDecode for i16 {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        r.read_short()
    }
}

impl CdrEncode for u32 {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_ulong(*self);
    }
}

impl CdrDecode for u32 {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        r.read_ulong()
    }
}

impl<T: CdrEncode> CdrEncode for [T] {
    fn encode(&self, w: &mut CdrWriter) {
        w.write_seq_len(self.len());
        for item in self {
            item.encode(w);
        }
    }
}

impl<T: CdrEncode> CdrEncode for Vec<T> {
    fn encode(&self, w: &mut CdrWriter) {
        self.as_slice().encode(w);
    }
}

impl<T: CdrDecode> CdrDecode for Vec<T> {
    fn decode(r: &mut CdrReader) -> Result<Self> {
        let count = r.read_seq_len()?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::decode(r)?);
        }
        Ok(items)
    }
}

// ============================================================================
// Tests
// ============================================================================
