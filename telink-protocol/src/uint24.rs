//! 24-bit unsigned integer.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use telink_codec::{
    CodecError, CustomDecode, CustomDecodingContainer, CustomEncode, CustomEncodingContainer,
    Endianness,
};

/// Unsigned integer stored in three bytes, in the engine's byte order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct U24(u32);

impl U24 {
    pub const LENGTH: usize = 3;
    pub const MIN: U24 = U24(0);
    pub const MAX: U24 = U24(0x00FF_FFFF);

    pub fn new(value: u32) -> Result<Self, ProtocolError> {
        if value > Self::MAX.0 {
            return Err(ProtocolError::OutOfRange {
                value,
                max: Self::MAX.0,
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    fn from_bytes(bytes: [u8; 3], endianness: Endianness) -> Self {
        let [a, b, c] = bytes;
        match endianness {
            Endianness::Little => Self(u32::from_le_bytes([a, b, c, 0])),
            Endianness::Big => Self(u32::from_be_bytes([0, a, b, c])),
        }
    }

    fn to_bytes(self, endianness: Endianness) -> [u8; 3] {
        match endianness {
            Endianness::Little => {
                let [a, b, c, _] = self.0.to_le_bytes();
                [a, b, c]
            }
            Endianness::Big => {
                let [_, a, b, c] = self.0.to_be_bytes();
                [a, b, c]
            }
        }
    }
}

impl TryFrom<u32> for U24 {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<U24> for u32 {
    fn from(value: U24) -> Self {
        value.0
    }
}

impl From<u16> for U24 {
    fn from(value: u16) -> Self {
        Self(u32::from(value))
    }
}

impl fmt::Display for U24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl CustomEncode for U24 {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError> {
        let bytes = self.to_bytes(container.endianness());
        container.encode_bytes(&bytes)
    }
}

impl CustomDecode for U24 {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
        let endianness = container.endianness();
        container.decode_map(Self::LENGTH, |data| {
            let bytes: [u8; 3] = data.try_into().ok()?;
            Some(Self::from_bytes(bytes, endianness))
        })
    }
}
