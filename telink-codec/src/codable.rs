//! Encoding and decoding traits, and their implementations for standard types.
//!
//! [`Encode`] and [`Decode`] are what the engines call. A type opts into
//! manual mode by implementing [`CustomEncode`] / [`CustomDecode`] instead;
//! the blanket implementations below route it to a custom container, so a
//! manual-mode type can sit inside an automatic-mode aggregate unchanged.

use crate::custom::{CustomDecodingContainer, CustomEncodingContainer};
use crate::decoder::DecoderEngine;
use crate::encoder::EncoderEngine;
use crate::error::CodecError;
use crate::primitive::Endianness;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// A value the encoder engine can write.
pub trait Encode {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError>;
}

/// A value the decoder engine can read.
pub trait Decode: Sized {
    fn decode(decoder: &mut DecoderEngine) -> Result<Self, CodecError>;
}

/// Manual-mode encoding: the type writes its own bytes.
pub trait CustomEncode {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError>;
}

/// Manual-mode decoding: the type reads its own bytes.
pub trait CustomDecode: Sized {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError>;
}

impl<T: CustomEncode + ?Sized> Encode for T {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
        encoder.encode_custom(self)
    }
}

impl<T: CustomDecode> Decode for T {
    fn decode(decoder: &mut DecoderEngine) -> Result<Self, CodecError> {
        decoder.decode_custom()
    }
}

macro_rules! primitive_codable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
                    encoder.single_value_container().encode(*self)
                }
            }

            impl Decode for $ty {
                fn decode(decoder: &mut DecoderEngine) -> Result<Self, CodecError> {
                    decoder.single_value_container().decode::<$ty>()
                }
            }
        )*
    };
}

primitive_codable!(u8, u16, u32, u64, i8, i16, i32, i64, bool, f32, f64);

impl Encode for str {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
        encoder.single_value_container().encode_string(self)
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
        self.as_str().encode(encoder)
    }
}

impl Decode for String {
    fn decode(decoder: &mut DecoderEngine) -> Result<Self, CodecError> {
        decoder.single_value_container().decode_string()
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
        let mut container = encoder.unkeyed_container();
        for element in self {
            container.encode(element)?;
        }
        Ok(())
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
        self.as_slice().encode(encoder)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(decoder: &mut DecoderEngine) -> Result<Self, CodecError> {
        let mut container = decoder.unkeyed_container()?;
        let mut values = Vec::with_capacity(container.count());
        while !container.is_at_end() {
            values.push(container.decode()?);
        }
        Ok(values)
    }
}

/// Blobs carry a big-endian `u16` length prefix.
impl Encode for Bytes {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
        let length = u16::try_from(self.len()).map_err(|_| CodecError::ValueTooLarge {
            path: encoder.coding_path().clone(),
            size: self.len(),
            max: usize::from(u16::MAX),
        })?;
        encoder.write_primitive(length, Endianness::Big);
        encoder.write_bytes(self);
        Ok(())
    }
}

impl Decode for Bytes {
    fn decode(decoder: &mut DecoderEngine) -> Result<Self, CodecError> {
        let length = decoder.read_primitive::<u16>(Endianness::Big)?;
        decoder.read_bytes_copy(usize::from(length))
    }
}

/// Timestamps are whole seconds since the Unix epoch as an `i32`.
impl Encode for DateTime<Utc> {
    fn encode(&self, encoder: &mut EncoderEngine) -> Result<(), CodecError> {
        let seconds = i32::try_from(self.timestamp()).map_err(|_| {
            encoder.invalid_encoding(format!("timestamp {} does not fit in 32 bits", self))
        })?;
        encoder.single_value_container().encode(seconds)
    }
}

impl Decode for DateTime<Utc> {
    fn decode(decoder: &mut DecoderEngine) -> Result<Self, CodecError> {
        let seconds = decoder.single_value_container().decode::<i32>()?;
        DateTime::from_timestamp(i64::from(seconds), 0)
            .ok_or_else(|| decoder.invalid_encoding(format!("invalid timestamp {}", seconds)))
    }
}
