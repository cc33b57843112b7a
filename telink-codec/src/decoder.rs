//! Decoder engine and automatic-mode decoding containers.

use crate::codable::{CustomDecode, Decode};
use crate::cursor::{ReadCursor, Shortfall};
use crate::custom::CustomDecodingContainer;
use crate::error::CodecError;
use crate::path::{CodingPath, FieldKey};
use crate::primitive::{Endianness, Primitive};
use crate::DEFAULT_MAX_DEPTH;
use bytes::Bytes;
use std::any::type_name;

/// Decodes values from byte buffers.
///
/// The decoder is a reusable configuration; every call to [`Decoder::decode`]
/// runs a fresh [`DecoderEngine`] over the given buffer.
#[derive(Debug, Clone)]
pub struct Decoder {
    endianness: Endianness,
    max_depth: usize,
}

impl Decoder {
    /// Creates a decoder whose automatic-mode primitives use `endianness`.
    pub fn new(endianness: Endianness) -> Self {
        Self {
            endianness,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting depth of decoded values.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decodes a `T` from the start of `data`.
    ///
    /// Trailing bytes that `T` does not consume are ignored.
    pub fn decode<T: Decode>(&self, data: impl Into<Bytes>) -> Result<T, CodecError> {
        let data = data.into();
        tracing::debug!("will decode {} from {} bytes", type_name::<T>(), data.len());
        let mut engine = DecoderEngine::new(data, self.endianness, self.max_depth);
        debug_assert!(engine.coding_path().is_empty());
        engine.decode_value()
    }

    /// Decodes a `T` from a borrowed slice, copying it first.
    pub fn decode_slice<T: Decode>(&self, data: &[u8]) -> Result<T, CodecError> {
        self.decode(Bytes::copy_from_slice(data))
    }
}

/// State of a single decode call: the read cursor and the coding path.
///
/// Containers borrow the engine mutably and cannot outlive it.
#[derive(Debug)]
pub struct DecoderEngine {
    cursor: ReadCursor,
    path: CodingPath,
    endianness: Endianness,
    depth: usize,
    max_depth: usize,
}

impl DecoderEngine {
    pub(crate) fn new(data: Bytes, endianness: Endianness, max_depth: usize) -> Self {
        Self {
            cursor: ReadCursor::new(data),
            path: CodingPath::new(),
            endianness,
            depth: 0,
            max_depth,
        }
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    /// Byte order used for automatic-mode primitives.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Decodes a nested value, enforcing the recursion ceiling.
    pub fn decode_value<T: Decode>(&mut self) -> Result<T, CodecError> {
        if self.depth >= self.max_depth {
            return Err(CodecError::RecursionLimit {
                path: self.path.clone(),
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = T::decode(self);
        self.depth -= 1;
        result
    }

    /// Decodes a nested value under `key`.
    pub fn decode_value_for_key<T: Decode>(
        &mut self,
        key: impl Into<FieldKey>,
    ) -> Result<T, CodecError> {
        self.with_key(key.into(), |decoder| {
            tracing::trace!(
                "will read {} at path \"{}\"",
                type_name::<T>(),
                decoder.path
            );
            decoder.decode_value()
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

    /// Hands a manual-mode type a custom container over this engine.
    pub(crate) fn decode_custom<T: CustomDecode>(&mut self) -> Result<T, CodecError> {
        tracing::trace!(
            "will decode {} with custom container at path \"{}\"",
            type_name::<T>(),
            self.path
        );
        let mut container = CustomDecodingContainer::new(self);
        T::decode_custom(&mut container)
    }

    pub fn keyed_container(&mut self) -> KeyedDecodingContainer<'_> {
        tracing::trace!("requested keyed container for path \"{}\"", self.path);
        KeyedDecodingContainer::new(self)
    }

    /// Opens an unkeyed container, reading its element count immediately.
    pub fn unkeyed_container(&mut self) -> Result<UnkeyedDecodingContainer<'_>, CodecError> {
        tracing::trace!("requested unkeyed container for path \"{}\"", self.path);
        UnkeyedDecodingContainer::new(self)
    }

    pub fn single_value_container(&mut self) -> SingleValueDecodingContainer<'_> {
        tracing::trace!(
            "requested single value container for path \"{}\"",
            self.path
        );
        SingleValueDecodingContainer::new(self)
    }

    /// Returns the next `nbytes` without consuming them.
    pub fn peek(&self, nbytes: usize) -> Result<&[u8], CodecError> {
        self.cursor
            .peek(nbytes)
            .map_err(|shortfall| self.insufficient(shortfall))
    }

    /// Reads `nbytes` as a view sharing the input buffer.
    pub fn read_bytes(&mut self, nbytes: usize) -> Result<Bytes, CodecError> {
        self.cursor
            .read(nbytes)
            .map_err(|shortfall| self.insufficient(shortfall))
    }

    /// Reads `nbytes` into an owned buffer.
    pub fn read_bytes_copy(&mut self, nbytes: usize) -> Result<Bytes, CodecError> {
        self.cursor
            .read_copy(nbytes)
            .map_err(|shortfall| self.insufficient(shortfall))
    }

    /// Reads `nbytes` through `map`, failing with `InvalidEncoding` on `None`.
    pub fn read_map<T>(
        &mut self,
        nbytes: usize,
        map: impl FnOnce(&[u8]) -> Option<T>,
    ) -> Result<T, CodecError> {
        let offset = self.offset();
        match self.cursor.read_map(nbytes, map) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(self.invalid_encoding(format!(
                "invalid data for {} at offset {}",
                type_name::<T>(),
                offset
            ))),
            Err(shortfall) => Err(self.insufficient(shortfall)),
        }
    }

    /// Reads a primitive in the given byte order.
    pub fn read_primitive<P: Primitive>(
        &mut self,
        endianness: Endianness,
    ) -> Result<P, CodecError> {
        let offset = self.offset();
        match self.cursor.read_primitive::<P>(endianness) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(CodecError::TypeMismatch {
                path: self.path.clone(),
                type_name: P::NAME,
                offset,
            }),
            Err(shortfall) => Err(self.insufficient(shortfall)),
        }
    }

    /// Reads a string prefixed by a one-byte length.
    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let offset = self.offset();
        let length = usize::from(self.read_primitive::<u8>(Endianness::Little)?);
        let data = self.read_bytes(length)?;
        match std::str::from_utf8(&data) {
            Ok(string) => Ok(string.to_owned()),
            Err(_) => Err(self.invalid_encoding(format!("invalid string at offset {}", offset))),
        }
    }

    pub(crate) fn insufficient(&self, shortfall: Shortfall) -> CodecError {
        CodecError::InsufficientData {
            path: self.path.clone(),
            needed: shortfall.needed,
            available: shortfall.available,
        }
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
}

/// Field-by-field view used by automatic-mode aggregates.
///
/// The wire format carries no field names or presence markers, so fields
/// must be requested in exactly the order they were written.
pub struct KeyedDecodingContainer<'e> {
    decoder: &'e mut DecoderEngine,
    coding_path: CodingPath,
}

impl<'e> KeyedDecodingContainer<'e> {
    fn new(decoder: &'e mut DecoderEngine) -> Self {
        let coding_path = decoder.coding_path().clone();
        Self {
            decoder,
            coding_path,
        }
    }

    /// Path of the aggregate this container reads.
    pub fn coding_path(&self) -> &CodingPath {
        &self.coding_path
    }

    /// Always `true`: the format has no presence markers to check against.
    pub fn contains(&self, key: &str) -> bool {
        tracing::trace!("check whether key \"{}\" exists", key);
        true
    }

    /// Always `false`: the format cannot represent an absent value.
    pub fn decode_nil(&mut self, key: impl Into<FieldKey>) -> Result<bool, CodecError> {
        self.decoder.with_key(key.into(), |decoder| {
            tracing::trace!("check if nil at path \"{}\"", decoder.coding_path());
            Ok(false)
        })
    }

    /// Decodes the next field as a `T`.
    pub fn decode<T: Decode>(&mut self, key: impl Into<FieldKey>) -> Result<T, CodecError> {
        self.decoder.decode_value_for_key(key)
    }

    /// Decodes the next field as a primitive in an explicit byte order.
    pub fn decode_primitive<P: Primitive>(
        &mut self,
        key: impl Into<FieldKey>,
        endianness: Endianness,
    ) -> Result<P, CodecError> {
        self.decoder.with_key(key.into(), |decoder| {
            tracing::trace!(
                "will read {} at path \"{}\"",
                P::NAME,
                decoder.coding_path()
            );
            decoder.read_primitive(endianness)
        })
    }
}

/// Sequential view over a count-prefixed run of elements.
///
/// Wire layout: one count byte, then for every element a one-byte positional
/// tag followed by the element.
pub struct UnkeyedDecodingContainer<'e> {
    decoder: &'e mut DecoderEngine,
    coding_path: CodingPath,
    count: usize,
    current_index: usize,
}

impl<'e> UnkeyedDecodingContainer<'e> {
    fn new(decoder: &'e mut DecoderEngine) -> Result<Self, CodecError> {
        let coding_path = decoder.coding_path().clone();
        let count = usize::from(decoder.read_primitive::<u8>(Endianness::Little)?);
        Ok(Self {
            decoder,
            coding_path,
            count,
            current_index: 0,
        })
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.coding_path
    }

    /// Number of elements announced by the count byte.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_at_end(&self) -> bool {
        self.current_index >= self.count
    }

    /// Always `false` while elements remain.
    pub fn decode_nil(&mut self) -> Result<bool, CodecError> {
        self.ensure_not_at_end()?;
        Ok(false)
    }

    /// Decodes the next element.
    pub fn decode<T: Decode>(&mut self) -> Result<T, CodecError> {
        self.ensure_not_at_end()?;
        let index = self.current_index;
        let value = self.decoder.with_key(FieldKey::Index(index), |decoder| {
            let offset = decoder.offset();
            let tag = decoder.read_primitive::<u8>(Endianness::Little)?;
            if usize::from(tag) != index {
                return Err(decoder.invalid_encoding(format!(
                    "expected element tag {} but found {} at offset {}",
                    index, tag, offset
                )));
            }
            tracing::trace!(
                "will read {} at path \"{}\"",
                type_name::<T>(),
                decoder.coding_path()
            );
            decoder.decode_value()
        })?;
        self.current_index += 1;
        Ok(value)
    }

    fn ensure_not_at_end(&self) -> Result<(), CodecError> {
        if self.is_at_end() {
            let mut path = self.decoder.coding_path().clone();
            path.push(FieldKey::Index(self.current_index));
            Err(CodecError::InvalidEncoding {
                path,
                reason: "unkeyed container is at end".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// View for a value that is a single primitive or string.
pub struct SingleValueDecodingContainer<'e> {
    decoder: &'e mut DecoderEngine,
    coding_path: CodingPath,
}

impl<'e> SingleValueDecodingContainer<'e> {
    fn new(decoder: &'e mut DecoderEngine) -> Self {
        let coding_path = decoder.coding_path().clone();
        Self {
            decoder,
            coding_path,
        }
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.coding_path
    }

    /// Always `false`: the format cannot represent an absent value.
    pub fn decode_nil(&self) -> bool {
        false
    }

    /// Decodes a primitive in the engine's byte order.
    pub fn decode<P: Primitive>(&mut self) -> Result<P, CodecError> {
        let endianness = self.decoder.endianness();
        self.decoder.read_primitive(endianness)
    }

    pub fn decode_string(&mut self) -> Result<String, CodecError> {
        self.decoder.read_string()
    }

    pub fn decode_value<T: Decode>(&mut self) -> Result<T, CodecError> {
        self.decoder.decode_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn engine(data: &'static [u8]) -> DecoderEngine {
        DecoderEngine::new(
            Bytes::from_static(data),
            Endianness::Little,
            DEFAULT_MAX_DEPTH,
        )
    }

    #[test]
    fn test_read_string() {
        let mut decoder = engine(b"\x05hello\x00");
        assert_eq!(decoder.read_string().unwrap(), "hello");
        assert_eq!(decoder.read_string().unwrap(), "");
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_read_string_invalid_utf8() {
        let mut decoder = engine(&[0x02, 0xC3, 0x28]);
        let err = decoder.read_string().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_read_string_truncated() {
        let mut decoder = engine(&[0x04, b'a', b'b']);
        let err = decoder.read_string().unwrap_err();
        assert_eq!(
            err,
            CodecError::InsufficientData {
                path: CodingPath::new(),
                needed: 4,
                available: 2,
            }
        );
    }

    #[test]
    fn test_read_primitive_insufficient() {
        let mut decoder = engine(&[0x01, 0x02, 0x03]);
        let err = decoder.read_primitive::<u32>(Endianness::Big).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        assert_eq!(decoder.offset(), 0);

        assert_eq!(
            decoder.read_primitive::<u16>(Endianness::Big).unwrap(),
            0x0102
        );
    }

    #[test]
    fn test_read_primitive_type_mismatch() {
        let mut decoder = engine(&[0x07]);
        let err = decoder
            .read_primitive::<bool>(Endianness::Little)
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::TypeMismatch {
                path: CodingPath::new(),
                type_name: "bool",
                offset: 0,
            }
        );
    }

    #[test]
    fn test_keyed_container_presence() {
        let mut decoder = engine(&[0x2A, 0x00]);
        let mut container = decoder.keyed_container();
        assert!(container.contains("anything"));
        assert!(!container.decode_nil("value").unwrap());
        assert_eq!(container.decode::<u16>("value").unwrap(), 42);
        assert!(container.coding_path().is_empty());
        assert!(decoder.coding_path().is_empty());
    }

    #[test]
    fn test_keyed_container_explicit_order() {
        let mut decoder = engine(&[0x55, 0xAA, 0x55, 0xAA]);
        let mut container = decoder.keyed_container();
        assert_eq!(
            container
                .decode_primitive::<u16>("big", Endianness::Big)
                .unwrap(),
            0x55AA
        );
        assert_eq!(
            container
                .decode_primitive::<u16>("little", Endianness::Little)
                .unwrap(),
            0xAA55
        );
    }

    #[test]
    fn test_unkeyed_container_reads_tags() {
        let mut decoder = engine(&[0x02, 0x00, 0x0A, 0x01, 0x0B]);
        let mut container = decoder.unkeyed_container().unwrap();
        assert_eq!(container.count(), 2);
        assert!(!container.decode_nil().unwrap());
        assert_eq!(container.decode::<u8>().unwrap(), 0x0A);
        assert_eq!(container.decode::<u8>().unwrap(), 0x0B);
        assert!(container.is_at_end());

        let err = container.decode::<u8>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
        assert_eq!(err.path().last(), Some(&FieldKey::Index(2)));
    }

    #[test]
    fn test_unkeyed_container_rejects_wrong_tag() {
        let mut decoder = engine(&[0x01, 0x05, 0x0A]);
        let mut container = decoder.unkeyed_container().unwrap();
        let err = container.decode::<u8>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
        assert_eq!(err.path().keys(), &[FieldKey::Index(0)]);
        assert!(decoder.coding_path().is_empty());
    }

    #[test]
    fn test_unkeyed_container_empty_buffer() {
        let mut decoder = engine(&[]);
        let err = decoder.unkeyed_container().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn test_single_value_container() {
        let mut decoder = engine(&[0x34, 0x12, 0x02, b'o', b'k']);
        let mut container = decoder.single_value_container();
        assert!(!container.decode_nil());
        assert_eq!(container.decode::<u16>().unwrap(), 0x1234);
        assert_eq!(container.decode_string().unwrap(), "ok");
    }

    #[test]
    fn test_path_popped_after_failure() {
        let mut decoder = engine(&[0x01]);
        let err = decoder
            .decode_value_for_key::<u32>("outer")
            .unwrap_err();
        assert_eq!(err.path().to_string(), "outer");
        assert!(decoder.coding_path().is_empty());
    }

    #[test]
    fn test_decoder_ignores_trailing_bytes() {
        let decoder = Decoder::new(Endianness::Big);
        let value: u16 = decoder
            .decode(Bytes::from_static(&[0x00, 0x09, 0xFF]))
            .unwrap();
        assert_eq!(value, 9);

        let value: u16 = decoder.decode_slice(&[0x01, 0x00]).unwrap();
        assert_eq!(value, 256);
    }
}
