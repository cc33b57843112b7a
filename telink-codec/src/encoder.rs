//! Encoder engine and automatic-mode encoding containers.

use crate::codable::{CustomEncode, Encode};
use crate::cursor::WriteCursor;
use crate::custom::CustomEncodingContainer;
use crate::error::CodecError;
use crate::path::{CodingPath, FieldKey};
use crate::primitive::{Endianness, Primitive};
use crate::{DEFAULT_MAX_DEPTH, MAX_STRING_LENGTH, MAX_UNKEYED_ELEMENTS};
use bytes::Bytes;
use std::any::type_name;

/// Encodes values into byte buffers.
#[derive(Debug, Clone)]
pub struct Encoder {
    endianness: Endianness,
    max_depth: usize,
    strict_ascii: bool,
}

impl Encoder {
    /// Creates an encoder whose automatic-mode primitives use `endianness`.
    pub fn new(endianness: Endianness) -> Self {
        Self {
            endianness,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_ascii: false,
        }
    }

    /// Sets the maximum nesting depth of encoded values.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fail instead of dropping non-ASCII characters from fixed-length strings.
    pub fn with_strict_ascii(mut self, strict: bool) -> Self {
        self.strict_ascii = strict;
        self
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_strict_ascii(&self) -> bool {
        self.strict_ascii
    }

    /// Encodes `value`, returning the produced bytes.
    pub fn encode<T: Encode + ?Sized>(&self, value: &T) -> Result<Bytes, CodecError> {
        tracing::debug!("will encode {}", type_name::<T>());
        let mut engine = EncoderEngine::new(self.endianness, self.max_depth, self.strict_ascii);
        engine.encode_value(value)?;
        let bytes = engine.into_bytes();
        tracing::debug!("encoded {} into {} bytes", type_name::<T>(), bytes.len());
        Ok(bytes)
    }
}

/// State of a single encode call: the output accumulator and the coding path.
#[derive(Debug)]
pub struct EncoderEngine {
    cursor: WriteCursor,
    path: CodingPath,
    endianness: Endianness,
    depth: usize,
    max_depth: usize,
    strict_ascii: bool,
}

impl EncoderEngine {
    pub(crate) fn new(endianness: Endianness, max_depth: usize, strict_ascii: bool) -> Self {
        Self {
            cursor: WriteCursor::new(),
            path: CodingPath::new(),
            endianness,
            depth: 0,
            max_depth,
            strict_ascii,
        }
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    /// Byte order used for automatic-mode primitives.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub(crate) fn is_strict_ascii(&self) -> bool {
        self.strict_ascii
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.cursor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    /// Encodes a nested value, enforcing the recursion ceiling.
    pub fn encode_value<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        if self.depth >= self.max_depth {
            return Err(CodecError::RecursionLimit {
                path: self.path.clone(),
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = value.encode(self);
        self.depth -= 1;
        result
    }

    /// Encodes a nested value under `key`.
    pub fn encode_value_for_key<T: Encode + ?Sized>(
        &mut self,
        value: &T,
        key: impl Into<FieldKey>,
    ) -> Result<(), CodecError> {
        self.with_key(key.into(), |encoder| {
            tracing::trace!(
                "will encode {} at path \"{}\"",
                type_name::<T>(),
                encoder.path
            );
            encoder.encode_value(value)
        })
    }

    /// Runs `f` with `key` pushed onto the coding path.
    ///
    /// The key is popped whether `f` succeeds or fails.
    pub(crate) fn with_key<T>(
        &mut self,
        key: FieldKey,
        f: impl FnOnce(&mut Self) -> Result<T, CodecError>,
    ) -> Result<T, CodecError> {
        self.path.push(key);
        let result = f(self);
        self.path.pop();
        result
    }

    /// Hands a manual-mode value a custom container over this engine.
    pub(crate) fn encode_custom<T: CustomEncode + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<(), CodecError> {
        tracing::trace!(
            "will encode {} with custom container at path \"{}\"",
            type_name::<T>(),
            self.path
        );
        let mut container = CustomEncodingContainer::new(self);
        value.encode_custom(&mut container)
    }

    pub fn keyed_container(&mut self) -> KeyedEncodingContainer<'_> {
        tracing::trace!("requested keyed container for path \"{}\"", self.path);
        KeyedEncodingContainer::new(self)
    }

    /// Opens an unkeyed container, reserving its count byte.
    pub fn unkeyed_container(&mut self) -> UnkeyedEncodingContainer<'_> {
        tracing::trace!("requested unkeyed container for path \"{}\"", self.path);
        UnkeyedEncodingContainer::new(self)
    }

    pub fn single_value_container(&mut self) -> SingleValueEncodingContainer<'_> {
        tracing::trace!(
            "requested single value container for path \"{}\"",
            self.path
        );
        SingleValueEncodingContainer::new(self)
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.cursor.write(data);
    }

    pub fn write_primitive<P: Primitive>(&mut self, value: P, endianness: Endianness) {
        self.cursor.write_primitive(value, endianness);
    }

    /// Writes a string prefixed by a one-byte length.
    pub fn write_string(&mut self, value: &str) -> Result<(), CodecError> {
        let length = value.len();
        if length > MAX_STRING_LENGTH {
            return Err(CodecError::ValueTooLarge {
                path: self.path.clone(),
                size: length,
                max: MAX_STRING_LENGTH,
            });
        }
        self.cursor.write_u8(length as u8);
        self.cursor.write(value.as_bytes());
        Ok(())
    }

    /// Discards bytes written after `len`, undoing a partial write.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.cursor.truncate(len);
    }

    pub(crate) fn patch(&mut self, offset: usize, byte: u8) {
        let patched = self.cursor.patch(offset, byte);
        debug_assert!(patched, "patch offset {} past end of output", offset);
    }

    /// Builds an `InvalidEncoding` error at the current path.
    pub fn invalid_encoding(&self, reason: impl Into<String>) -> CodecError {
        CodecError::InvalidEncoding {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(&self, operation: &'static str) -> CodecError {
        CodecError::Unsupported {
            path: self.path.clone(),
            operation,
        }
    }

    pub(crate) fn into_bytes(self) -> Bytes {
        self.cursor.into_bytes()
    }
}

/// Field-by-field view used by automatic-mode aggregates.
///
/// Keys only feed the coding path; the bytes of each field follow one
/// another with no names or separators.
pub struct KeyedEncodingContainer<'e> {
    encoder: &'e mut EncoderEngine,
    coding_path: CodingPath,
}

impl<'e> KeyedEncodingContainer<'e> {
    fn new(encoder: &'e mut EncoderEngine) -> Self {
        let coding_path = encoder.coding_path().clone();
        Self {
            encoder,
            coding_path,
        }
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.coding_path
    }

    pub fn encode<T: Encode + ?Sized>(
        &mut self,
        value: &T,
        key: impl Into<FieldKey>,
    ) -> Result<(), CodecError> {
        self.encoder.encode_value_for_key(value, key)
    }

    /// Encodes a primitive field in an explicit byte order.
    pub fn encode_primitive<P: Primitive>(
        &mut self,
        value: P,
        key: impl Into<FieldKey>,
        endianness: Endianness,
    ) -> Result<(), CodecError> {
        self.encoder.with_key(key.into(), |encoder| {
            tracing::trace!(
                "will encode {} at path \"{}\"",
                P::NAME,
                encoder.coding_path()
            );
            encoder.write_primitive(value, endianness);
            Ok(())
        })
    }
}

/// Sequential view that writes a count-prefixed run of elements.
///
/// A placeholder count byte is reserved when the container opens. Every
/// element is preceded by a one-byte positional tag, and the count byte is
/// patched after each append so it always matches the elements written.
pub struct UnkeyedEncodingContainer<'e> {
    encoder: &'e mut EncoderEngine,
    coding_path: CodingPath,
    count_offset: usize,
    count: usize,
}

impl<'e> UnkeyedEncodingContainer<'e> {
    fn new(encoder: &'e mut EncoderEngine) -> Self {
        let coding_path = encoder.coding_path().clone();
        let count_offset = encoder.len();
        encoder.write_bytes(&[0]);
        Self {
            encoder,
            coding_path,
            count_offset,
            count: 0,
        }
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.coding_path
    }

    /// Number of elements encoded so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Appends one element.
    ///
    /// Fails with `ValueTooLarge` once the container already holds
    /// [`MAX_UNKEYED_ELEMENTS`] elements.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        if self.count >= MAX_UNKEYED_ELEMENTS {
            return Err(CodecError::ValueTooLarge {
                path: self.coding_path.clone(),
                size: self.count + 1,
                max: MAX_UNKEYED_ELEMENTS,
            });
        }
        let index = self.count;
        let start = self.encoder.len();
        let result = self.encoder.with_key(FieldKey::Index(index), |encoder| {
            tracing::trace!(
                "will encode {} at path \"{}\"",
                type_name::<T>(),
                encoder.coding_path()
            );
            encoder.write_primitive(index as u8, Endianness::Little);
            encoder.encode_value(value)
        });
        if let Err(err) = result {
            self.encoder.truncate(start);
            return Err(err);
        }
        self.count += 1;
        self.encoder.patch(self.count_offset, self.count as u8);
        Ok(())
    }
}

/// View for a value that is a single primitive or string.
///
/// Exactly one write is allowed.
pub struct SingleValueEncodingContainer<'e> {
    encoder: &'e mut EncoderEngine,
    coding_path: CodingPath,
    did_write: bool,
}

impl<'e> SingleValueEncodingContainer<'e> {
    fn new(encoder: &'e mut EncoderEngine) -> Self {
        let coding_path = encoder.coding_path().clone();
        Self {
            encoder,
            coding_path,
            did_write: false,
        }
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.coding_path
    }

    /// Encodes a primitive in the engine's byte order.
    pub fn encode<P: Primitive>(&mut self, value: P) -> Result<(), CodecError> {
        self.begin_write()?;
        let endianness = self.encoder.endianness();
        self.encoder.write_primitive(value, endianness);
        Ok(())
    }

    pub fn encode_string(&mut self, value: &str) -> Result<(), CodecError> {
        self.begin_write()?;
        self.encoder.write_string(value)
    }

    pub fn encode_value<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        self.begin_write()?;
        self.encoder.encode_value(value)
    }

    fn begin_write(&mut self) -> Result<(), CodecError> {
        if self.did_write {
            return Err(self
                .encoder
                .unsupported("single value container already written"));
        }
        self.did_write = true;
        Ok(())
    }
}
