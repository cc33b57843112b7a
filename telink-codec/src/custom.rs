//! Manual-mode containers.
//!
//! A type that implements [`CustomDecode`](crate::CustomDecode) or
//! [`CustomEncode`](crate::CustomEncode) receives one of these views and
//! controls every byte itself: primitives in an explicit byte order, raw
//! byte ranges, lookahead, and nested values that may use either mode.

use crate::codable::{Decode, Encode};
use crate::decoder::DecoderEngine;
use crate::encoder::EncoderEngine;
use crate::error::CodecError;
use crate::path::{CodingPath, FieldKey};
use crate::primitive::{Endianness, Primitive};
use bytes::Bytes;
use std::any::type_name;

/// Manual-mode view over a [`DecoderEngine`].
pub struct CustomDecodingContainer<'e> {
    decoder: &'e mut DecoderEngine,
}

impl<'e> CustomDecodingContainer<'e> {
    pub(crate) fn new(decoder: &'e mut DecoderEngine) -> Self {
        Self { decoder }
    }

    pub fn coding_path(&self) -> &CodingPath {
        self.decoder.coding_path()
    }

    /// Byte order the engine was configured with.
    pub fn endianness(&self) -> Endianness {
        self.decoder.endianness()
    }

    /// Bytes left in the input buffer.
    pub fn remaining_bytes(&self) -> usize {
        self.decoder.remaining()
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining_bytes() == 0
    }

    /// Decodes a primitive in an explicit byte order.
    pub fn decode<P: Primitive>(&mut self, endianness: Endianness) -> Result<P, CodecError> {
        tracing::trace!(
            "will read {} at path \"{}\"",
            P::NAME,
            self.decoder.coding_path()
        );
        self.decoder.read_primitive(endianness)
    }

    /// Reads `length` bytes into an owned buffer that outlives the input.
    pub fn decode_bytes(&mut self, length: usize) -> Result<Bytes, CodecError> {
        tracing::trace!(
            "will read {} bytes at path \"{}\"",
            length,
            self.decoder.coding_path()
        );
        self.decoder.read_bytes_copy(length)
    }

    /// Reads `length` bytes as a view sharing the input buffer.
    pub fn decode_shared(&mut self, length: usize) -> Result<Bytes, CodecError> {
        tracing::trace!(
            "will read {} shared bytes at path \"{}\"",
            length,
            self.decoder.coding_path()
        );
        self.decoder.read_bytes(length)
    }

    /// Reads `length` bytes and converts them with `map`.
    ///
    /// Fails with `InvalidEncoding` when `map` returns `None`; the bytes are
    /// not consumed in that case.
    pub fn decode_map<T>(
        &mut self,
        length: usize,
        map: impl FnOnce(&[u8]) -> Option<T>,
    ) -> Result<T, CodecError> {
        tracing::trace!(
            "will read {} from {} bytes at path \"{}\"",
            type_name::<T>(),
            length,
            self.decoder.coding_path()
        );
        self.decoder.read_map(length, map)
    }

    /// Reads every byte left in the buffer into an owned buffer.
    pub fn decode_remaining(&mut self) -> Result<Bytes, CodecError> {
        let length = self.remaining_bytes();
        self.decode_bytes(length)
    }

    /// Decodes a nested value, in manual or automatic mode as it declares.
    pub fn decode_value<T: Decode>(&mut self) -> Result<T, CodecError> {
        self.decoder.decode_value()
    }

    /// Decodes a nested value under `key`.
    pub fn decode_value_for_key<T: Decode>(
        &mut self,
        key: impl Into<FieldKey>,
    ) -> Result<T, CodecError> {
        self.decoder.decode_value_for_key(key)
    }

    /// Decodes `count` values stored back to back with no count prefix.
    pub fn decode_array<T: Decode>(
        &mut self,
        key: impl Into<FieldKey>,
        count: usize,
    ) -> Result<Vec<T>, CodecError> {
        self.decoder.with_key(key.into(), |decoder| {
            let mut values = Vec::with_capacity(count);
            for index in 0..count {
                values.push(decoder.decode_value_for_key(index)?);
            }
            Ok(values)
        })
    }

    /// Reads a string prefixed by a one-byte length.
    pub fn decode_string(&mut self) -> Result<String, CodecError> {
        self.decoder.read_string()
    }

    /// Reads a zero-padded ASCII string occupying exactly `length` bytes.
    pub fn decode_fixed_ascii(&mut self, length: usize) -> Result<String, CodecError> {
        let offset = self.decoder.offset();
        let data = self.decoder.peek(length)?;
        let end = data
            .iter()
            .rposition(|&byte| byte != 0)
            .map_or(0, |position| position + 1);
        let text = &data[..end];
        if !text.is_ascii() {
            return Err(self
                .decoder
                .invalid_encoding(format!("non-ASCII string at offset {}", offset)));
        }
        let string: String = text.iter().map(|&byte| char::from(byte)).collect();
        self.decoder.read_bytes(length)?;
        Ok(string)
    }

    /// Returns the next byte without consuming it.
    pub fn peek_byte(&self) -> Result<u8, CodecError> {
        Ok(self.decoder.peek(1)?[0])
    }

    /// Returns the next `length` bytes without consuming them.
    pub fn peek(&self, length: usize) -> Result<&[u8], CodecError> {
        self.decoder.peek(length)
    }

    /// Converts the next `length` bytes with `map` without consuming them.
    pub fn peek_map<T>(
        &self,
        length: usize,
        map: impl FnOnce(&[u8]) -> Option<T>,
    ) -> Result<T, CodecError> {
        let data = self.decoder.peek(length)?;
        map(data).ok_or_else(|| {
            self.decoder.invalid_encoding(format!(
                "invalid data for {} at offset {}",
                type_name::<T>(),
                self.decoder.offset()
            ))
        })
    }

    /// Builds an `InvalidEncoding` error for a value that fails validation.
    pub fn invalid_data(&self, reason: impl Into<String>) -> CodecError {
        self.decoder.invalid_encoding(reason)
    }

    /// Not available in manual mode.
    pub fn keyed_container(&mut self) -> Result<crate::KeyedDecodingContainer<'_>, CodecError> {
        Err(self.decoder.unsupported("keyed container in custom container"))
    }

    /// Not available in manual mode.
    pub fn unkeyed_container(&mut self) -> Result<crate::UnkeyedDecodingContainer<'_>, CodecError> {
        Err(self.decoder.unsupported("unkeyed container in custom container"))
    }
}

/// Manual-mode view over an [`EncoderEngine`].
pub struct CustomEncodingContainer<'e> {
    encoder: &'e mut EncoderEngine,
}

impl<'e> CustomEncodingContainer<'e> {
    pub(crate) fn new(encoder: &'e mut EncoderEngine) -> Self {
        Self { encoder }
    }

    pub fn coding_path(&self) -> &CodingPath {
        self.encoder.coding_path()
    }

    /// Byte order the engine was configured with.
    pub fn endianness(&self) -> Endianness {
        self.encoder.endianness()
    }

    /// Encodes a primitive in an explicit byte order.
    pub fn encode<P: Primitive>(
        &mut self,
        value: P,
        endianness: Endianness,
    ) -> Result<(), CodecError> {
        tracing::trace!(
            "will encode {} at path \"{}\"",
            P::NAME,
            self.encoder.coding_path()
        );
        self.encoder.write_primitive(value, endianness);
        Ok(())
    }

    /// Appends raw bytes.
    pub fn encode_bytes(&mut self, data: &[u8]) -> Result<(), CodecError> {
        tracing::trace!(
            "will encode {} bytes at path \"{}\"",
            data.len(),
            self.encoder.coding_path()
        );
        self.encoder.write_bytes(data);
        Ok(())
    }

    /// Encodes a nested value, in manual or automatic mode as it declares.
    pub fn encode_value<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        self.encoder.encode_value(value)
    }

    /// Encodes a nested value under `key`. The key only affects the coding path.
    pub fn encode_value_for_key<T: Encode + ?Sized>(
        &mut self,
        value: &T,
        key: impl Into<FieldKey>,
    ) -> Result<(), CodecError> {
        self.encoder.encode_value_for_key(value, key)
    }

    /// Encodes `values` back to back with no count prefix.
    pub fn encode_array<T: Encode>(
        &mut self,
        values: &[T],
        key: impl Into<FieldKey>,
    ) -> Result<(), CodecError> {
        self.encoder.with_key(key.into(), |encoder| {
            for (index, value) in values.iter().enumerate() {
                encoder.encode_value_for_key(value, index)?;
            }
            Ok(())
        })
    }

    /// Writes a string prefixed by a one-byte length.
    pub fn encode_string(&mut self, value: &str) -> Result<(), CodecError> {
        self.encoder.write_string(value)
    }

    /// Writes `value` as ASCII occupying exactly `length` bytes.
    ///
    /// Longer strings are truncated and shorter ones padded with zero bytes.
    /// Non-ASCII characters are dropped, unless the encoder is strict, in
    /// which case they fail with `InvalidEncoding`.
    pub fn encode_fixed_ascii(&mut self, value: &str, length: usize) -> Result<(), CodecError> {
        let mut data: Vec<u8> = value
            .chars()
            .filter(char::is_ascii)
            .map(|c| c as u8)
            .collect();
        if data.len() != value.chars().count() {
            if self.encoder.is_strict_ascii() {
                return Err(self
                    .encoder
                    .invalid_encoding(format!("non-ASCII characters in {:?}", value)));
            }
            tracing::warn!(
                "dropped non-ASCII characters from {:?} at path \"{}\"",
                value,
                self.encoder.coding_path()
            );
        }
        data.resize(length, 0);
        self.encode_bytes(&data)
    }

    /// Not available in manual mode.
    pub fn keyed_container(&mut self) -> Result<crate::KeyedEncodingContainer<'_>, CodecError> {
        Err(self.encoder.unsupported("keyed container in custom container"))
    }

    /// Not available in manual mode.
    pub fn unkeyed_container(&mut self) -> Result<crate::UnkeyedEncodingContainer<'_>, CodecError> {
        Err(self.encoder.unsupported("unkeyed container in custom container"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codable::{CustomDecode, CustomEncode};
    use crate::decoder::Decoder;
    use crate::encoder::Encoder;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    /// Tag byte, big-endian id, little-endian reading, length-prefixed name.
    #[derive(Debug, Clone, PartialEq)]
    struct Reading {
        id: u16,
        value: i32,
        name: String,
    }

    impl CustomEncode for Reading {
        fn encode_custom(
            &self,
            container: &mut CustomEncodingContainer<'_>,
        ) -> Result<(), CodecError> {
            container.encode(0xA5u8, Endianness::Big)?;
            container.encode(self.id, Endianness::Big)?;
            container.encode(self.value, Endianness::Little)?;
            container.encode_string(&self.name)
        }
    }

    impl CustomDecode for Reading {
        fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
            let tag: u8 = container.decode(Endianness::Big)?;
            if tag != 0xA5 {
                return Err(container.invalid_data(format!("unexpected tag {:#04x}", tag)));
            }
            Ok(Self {
                id: container.decode(Endianness::Big)?,
                value: container.decode(Endianness::Little)?,
                name: container.decode_string()?,
            })
        }
    }

    /// A byte run of two kinds, chosen by peeking at the first byte.
    #[derive(Debug, PartialEq)]
    enum Record {
        Short(u8),
        Long(Bytes),
    }

    impl CustomDecode for Record {
        fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
            if container.peek_byte()? & 0x80 == 0 {
                Ok(Record::Short(container.decode(Endianness::Big)?))
            } else {
                container.decode_bytes(1)?;
                Ok(Record::Long(container.decode_remaining()?))
            }
        }
    }

    /// Decodes itself again until the recursion ceiling stops it.
    #[derive(Debug)]
    struct Endless;

    impl CustomDecode for Endless {
        fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
            container.decode_value_for_key("next")
        }
    }

    /// Encodes itself again until the recursion ceiling stops it.
    struct Spiral;

    impl CustomEncode for Spiral {
        fn encode_custom(
            &self,
            container: &mut CustomEncodingContainer<'_>,
        ) -> Result<(), CodecError> {
            container.encode(0x01u8, Endianness::Big)?;
            container.encode_value_for_key(self, "next")
        }
    }

    struct Label<'a>(&'a str, usize);

    impl CustomEncode for Label<'_> {
        fn encode_custom(
            &self,
            container: &mut CustomEncodingContainer<'_>,
        ) -> Result<(), CodecError> {
            container.encode_fixed_ascii(self.0, self.1)
        }
    }

    struct Nesting;

    impl CustomEncode for Nesting {
        fn encode_custom(
            &self,
            container: &mut CustomEncodingContainer<'_>,
        ) -> Result<(), CodecError> {
            container.keyed_container()?;
            Ok(())
        }
    }

    #[test]
    fn test_manual_layout() {
        let reading = Reading {
            id: 0x0102,
            value: 3,
            name: "t".to_string(),
        };
        // The engine byte order does not affect explicit primitives.
        for endianness in [Endianness::Little, Endianness::Big] {
            let bytes = Encoder::new(endianness).encode(&reading).unwrap();
            assert_eq!(
                bytes.as_ref(),
                &[0xA5, 0x01, 0x02, 0x03, 0x00, 0x00, 0x00, 0x01, b't']
            );
        }
    }

    #[test]
    fn test_manual_validation_failure() {
        let err = Decoder::new(Endianness::Big)
            .decode::<Reading>(Bytes::from_static(&[0x00, 0x01, 0x02]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_peek_drives_branch() {
        let decoder = Decoder::new(Endianness::Big);
        let short: Record = decoder.decode(Bytes::from_static(&[0x05])).unwrap();
        assert_eq!(short, Record::Short(5));
        assert_eq!(
            decoder
                .decode::<Record>(Bytes::from_static(&[0x80, 0x01, 0x02]))
                .unwrap(),
            Record::Long(Bytes::from_static(&[0x01, 0x02]))
        );

        let err = decoder.decode::<Record>(Bytes::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn test_fixed_ascii_pads_and_truncates() {
        let encoder = Encoder::new(Endianness::Big);
        assert_eq!(
            encoder.encode(&Label("ab", 4)).unwrap().as_ref(),
            &[b'a', b'b', 0, 0]
        );
        assert_eq!(
            encoder.encode(&Label("abcdef", 3)).unwrap().as_ref(),
            b"abc"
        );
    }

    #[test]
    fn test_fixed_ascii_non_ascii() {
        let lenient = Encoder::new(Endianness::Big);
        assert_eq!(
            lenient.encode(&Label("aéb", 3)).unwrap().as_ref(),
            &[b'a', b'b', 0]
        );

        let strict = Encoder::new(Endianness::Big).with_strict_ascii(true);
        let err = strict.encode(&Label("aéb", 3)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_fixed_ascii_decode() {
        let data = Bytes::from_static(&[b'h', b'i', 0, 0, 0xC3]);
        let mut engine = DecoderEngine::new(data, Endianness::Big, 8);
        let mut container = CustomDecodingContainer::new(&mut engine);
        assert_eq!(container.decode_fixed_ascii(4).unwrap(), "hi");
        assert_eq!(container.remaining_bytes(), 1);

        let err = container.decode_fixed_ascii(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_fixed_ascii_decode_failure_keeps_offset() {
        let data = Bytes::from_static(&[b'a', 0xC3, b'b']);
        let mut engine = DecoderEngine::new(data, Endianness::Big, 8);
        let mut container = CustomDecodingContainer::new(&mut engine);
        let err = container.decode_fixed_ascii(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
        assert_eq!(container.remaining_bytes(), 3);

        let err = container.decode_fixed_ascii(4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
        assert_eq!(container.remaining_bytes(), 3);

        assert_eq!(container.decode_fixed_ascii(1).unwrap(), "a");
        assert_eq!(container.remaining_bytes(), 2);
    }

    #[test]
    fn test_arrays_have_no_prefix() {
        let mut encoder = EncoderEngine::new(Endianness::Big, 8, false);
        CustomEncodingContainer::new(&mut encoder)
            .encode_array(&[0x0102u16, 0x0304], "values")
            .unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(bytes.as_ref(), &[0x01, 0x02, 0x03, 0x04]);

        let mut decoder = DecoderEngine::new(bytes, Endianness::Big, 8);
        let mut container = CustomDecodingContainer::new(&mut decoder);
        let values: Vec<u16> = container.decode_array("values", 2).unwrap();
        assert_eq!(values, vec![0x0102, 0x0304]);
        assert!(container.is_at_end());

        let err = container.decode_array::<u16>("values", 1).unwrap_err();
        assert_eq!(err.path().to_string(), "values.0");
        assert!(container.coding_path().is_empty());
    }

    #[test]
    fn test_peek_map_does_not_consume() {
        let mut engine = DecoderEngine::new(Bytes::from_static(&[0x02, 0x11]), Endianness::Big, 8);
        let container = CustomDecodingContainer::new(&mut engine);
        let even = container.peek_map(1, |d| Some(d[0] % 2 == 0)).unwrap();
        assert!(even);
        let err = container.peek_map(1, |_| None::<u8>).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
        assert_eq!(container.remaining_bytes(), 2);
        assert_eq!(container.peek(2).unwrap(), &[0x02, 0x11]);
    }

    #[test]
    fn test_shared_and_copied_reads() {
        let source = Bytes::from_static(&[1, 2, 3, 4]);
        let mut engine = DecoderEngine::new(source, Endianness::Big, 8);
        let mut container = CustomDecodingContainer::new(&mut engine);
        let shared = container.decode_shared(2).unwrap();
        let copied = container.decode_bytes(2).unwrap();
        assert_eq!(shared.as_ref(), &[1, 2]);
        assert_eq!(copied.as_ref(), &[3, 4]);
    }

    #[test]
    fn test_decode_map() {
        let mut engine = DecoderEngine::new(Bytes::from_static(b"42x"), Endianness::Big, 8);
        let mut container = CustomDecodingContainer::new(&mut engine);
        let parse = |data: &[u8]| std::str::from_utf8(data).ok()?.parse::<u32>().ok();
        assert_eq!(container.decode_map(2, parse).unwrap(), 42);
        let err = container.decode_map(1, parse).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
        assert_eq!(container.remaining_bytes(), 1);
    }

    #[test]
    fn test_nested_containers_unsupported() {
        let err = Encoder::new(Endianness::Big).encode(&Nesting).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);

        let mut engine = DecoderEngine::new(Bytes::new(), Endianness::Big, 8);
        let mut container = CustomDecodingContainer::new(&mut engine);
        assert_eq!(
            container.unkeyed_container().err().map(|err| err.kind()),
            Some(ErrorKind::Unsupported)
        );
        assert_eq!(
            container.keyed_container().err().map(|err| err.kind()),
            Some(ErrorKind::Unsupported)
        );
    }

    #[test]
    fn test_recursion_limit() {
        let err = Decoder::new(Endianness::Big)
            .with_max_depth(16)
            .decode::<Endless>(Bytes::new())
            .unwrap_err();
        assert!(matches!(err, CodecError::RecursionLimit { limit: 16, .. }));
        assert_eq!(err.path().len(), 16);
    }

    #[test]
    fn test_encode_recursion_limit() {
        let err = Encoder::new(Endianness::Big)
            .with_max_depth(8)
            .encode(&Spiral)
            .unwrap_err();
        assert!(matches!(err, CodecError::RecursionLimit { limit: 8, .. }));
        assert_eq!(err.path().len(), 8);

        let mut engine = EncoderEngine::new(Endianness::Big, 4, false);
        let err = engine.encode_value(&Spiral).unwrap_err();
        assert!(matches!(err, CodecError::RecursionLimit { limit: 4, .. }));
        assert!(engine.coding_path().is_empty());
    }

    proptest! {
        #[test]
        fn test_manual_round_trip(id: u16, value: i32, name in "[ -~]{0,64}") {
            let reading = Reading { id, value, name };
            let bytes = Encoder::new(Endianness::Little).encode(&reading).unwrap();
            let decoded: Reading = Decoder::new(Endianness::Little).decode(bytes).unwrap();
            prop_assert_eq!(decoded, reading);
        }
    }
}
