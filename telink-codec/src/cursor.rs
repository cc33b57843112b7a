//! Byte cursors over encode and decode buffers.
//!
//! [`ReadCursor`] wraps an immutable [`Bytes`] buffer. Reads either hand out a
//! zero-copy view that shares the source allocation ([`ReadCursor::read`]) or
//! an owned copy that does not keep the source alive ([`ReadCursor::read_copy`]).
//! Values that store a field past the decode call, such as a frame payload,
//! should take the copy.
//!
//! [`WriteCursor`] is an append-only accumulator that grows as needed.

use crate::primitive::{Endianness, Primitive};
use bytes::{BufMut, Bytes, BytesMut};

/// A read that asked for more bytes than remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub needed: usize,
    pub available: usize,
}

/// Read position over an immutable buffer.
///
/// The offset never exceeds the buffer length. A failed read leaves the
/// offset untouched.
#[derive(Debug, Clone)]
pub struct ReadCursor {
    data: Bytes,
    offset: usize,
}

impl ReadCursor {
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    fn ensure(&self, nbytes: usize) -> Result<(), Shortfall> {
        if self.remaining() < nbytes {
            Err(Shortfall {
                needed: nbytes,
                available: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    /// Returns the next `nbytes` without advancing.
    pub fn peek(&self, nbytes: usize) -> Result<&[u8], Shortfall> {
        self.ensure(nbytes)?;
        Ok(&self.data[self.offset..self.offset + nbytes])
    }

    /// Reads `nbytes` as a view sharing the source buffer.
    pub fn read(&mut self, nbytes: usize) -> Result<Bytes, Shortfall> {
        self.ensure(nbytes)?;
        let view = self.data.slice(self.offset..self.offset + nbytes);
        self.offset += nbytes;
        Ok(view)
    }

    /// Reads `nbytes` into a freshly allocated buffer.
    pub fn read_copy(&mut self, nbytes: usize) -> Result<Bytes, Shortfall> {
        self.ensure(nbytes)?;
        let copy = Bytes::copy_from_slice(&self.data[self.offset..self.offset + nbytes]);
        self.offset += nbytes;
        Ok(copy)
    }

    /// Hands the next `nbytes` to `map` and advances only if it returns `Some`.
    pub fn read_map<T>(
        &mut self,
        nbytes: usize,
        map: impl FnOnce(&[u8]) -> Option<T>,
    ) -> Result<Option<T>, Shortfall> {
        let value = map(self.peek(nbytes)?);
        if value.is_some() {
            self.offset += nbytes;
        }
        Ok(value)
    }

    /// Reads a primitive, advancing only when the bytes parse.
    pub fn read_primitive<P: Primitive>(
        &mut self,
        endianness: Endianness,
    ) -> Result<Option<P>, Shortfall> {
        self.read_map(P::BYTE_LENGTH, |data| P::from_bytes(data, endianness))
    }
}

/// Append-only output buffer.
#[derive(Debug, Default)]
pub struct WriteCursor {
    buf: BytesMut,
}

impl WriteCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write(&mut self, data: &[u8]) {
        self.buf.reserve(data.len());
        self.buf.put_slice(data);
    }

    pub fn write_u8(&mut self, byte: u8) {
        self.buf.put_u8(byte);
    }

    pub fn write_primitive<P: Primitive>(&mut self, value: P, endianness: Endianness) {
        self.buf.reserve(P::BYTE_LENGTH);
        value.write_bytes(&mut self.buf, endianness);
    }

    /// Overwrites a byte that was already written.
    ///
    /// Returns `false` if `offset` is past the end of the written data.
    pub fn patch(&mut self, offset: usize, byte: u8) -> bool {
        match self.buf.get_mut(offset) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }

    /// Drops everything written after the first `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the cursor, returning the written bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}
