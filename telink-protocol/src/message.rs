//! Serial port protocol frames.
//!
//! Frame layout, all fields big-endian:
//!
//! ```text
//! +-----------+---------+------------------+
//! | type code | length  | payload          |
//! | 2 bytes   | 2 bytes | remaining bytes  |
//! +-----------+---------+------------------+
//! ```
//!
//! `length` counts the payload plus two. Decoding trusts the buffer, not the
//! length field, so frames with a wrong length are accepted unless the
//! strict path is used.

use crate::error::ProtocolError;
use crate::hexstr::serde_hex;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use telink_codec::{
    CodecError, CustomDecode, CustomDecodingContainer, CustomEncode, CustomEncodingContainer,
    Decode, Decoder, Encode, Encoder, Endianness,
};

/// Byte order of every frame field.
pub const FRAME_ENDIANNESS: Endianness = Endianness::Big;

/// Size of the type code and length fields.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Largest payload whose length still fits the length field.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize - 2;

/// Serial port protocol type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolType(pub u16);

impl From<u16> for ProtocolType {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl FromStr for ProtocolType {
    type Err = ProtocolError;

    /// Accepts `0x55AA` style hex or plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(digits) => u16::from_str_radix(digits, 16),
            None => s.parse(),
        };
        parsed
            .map(Self)
            .map_err(|err| ProtocolError::InvalidHex(format!("{:?}: {}", s, err)))
    }
}

impl CustomEncode for ProtocolType {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError> {
        container.encode(self.0, FRAME_ENDIANNESS)
    }
}

impl CustomDecode for ProtocolType {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
        Ok(Self(container.decode(FRAME_ENDIANNESS)?))
    }
}

/// A serial port protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    message_type: ProtocolType,
    length: u16,
    #[serde(with = "serde_hex")]
    payload: Bytes,
}

impl Message {
    /// Creates a message, deriving the length field from the payload.
    pub fn new(
        message_type: ProtocolType,
        payload: impl Into<Bytes>,
    ) -> Result<Self, ProtocolError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self {
            message_type,
            length: payload.len() as u16 + 2,
            payload,
        })
    }

    /// Creates a message with an explicit, possibly inconsistent, length field.
    pub fn from_parts(message_type: ProtocolType, length: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            message_type,
            length,
            payload: payload.into(),
        }
    }

    /// Decodes a frame, accepting a length field that disagrees with the payload.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        Ok(Decoder::new(FRAME_ENDIANNESS).decode(data)?)
    }

    /// Decodes a frame and rejects it if the length field is wrong.
    pub fn decode_strict(data: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        let message = Self::from_bytes(data)?;
        message.check_length()?;
        Ok(message)
    }

    /// Encodes the frame.
    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        Ok(Encoder::new(FRAME_ENDIANNESS).encode(self)?)
    }

    pub fn message_type(&self) -> ProtocolType {
        self.message_type
    }

    /// Length field as found on the wire.
    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Length field a well-formed frame with this payload would carry.
    pub fn expected_length(&self) -> usize {
        self.payload.len() + 2
    }

    /// Checks the length field against the payload.
    pub fn check_length(&self) -> Result<(), ProtocolError> {
        if usize::from(self.length) != self.expected_length() {
            return Err(ProtocolError::LengthMismatch {
                declared: self.length,
                actual: self.expected_length(),
            });
        }
        Ok(())
    }
}

impl CustomEncode for Message {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError> {
        container.encode_value_for_key(&self.message_type, "type")?;
        container.encode(self.length, FRAME_ENDIANNESS)?;
        container.encode_bytes(&self.payload)
    }
}

impl CustomDecode for Message {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
        let message_type = container.decode_value_for_key("type")?;
        let length: u16 = container.decode(FRAME_ENDIANNESS)?;
        let payload = container.decode_remaining()?;
        if usize::from(length) != payload.len() + 2 {
            tracing::warn!(
                "frame {} declares length {} but carries {} payload bytes",
                message_type,
                length,
                payload.len()
            );
        }
        Ok(Self {
            message_type,
            length,
            payload,
        })
    }
}

/// A payload sent to the device under a fixed type code.
pub trait SerialPortCommand: Encode {
    const TYPE: ProtocolType;

    /// Encodes `self` as the payload of a [`Self::TYPE`] frame.
    fn to_message(&self) -> Result<Message, ProtocolError> {
        let payload = Encoder::new(FRAME_ENDIANNESS).encode(self)?;
        Message::new(Self::TYPE, payload)
    }
}

/// A payload received from the device under a fixed type code.
pub trait SerialPortEvent: Decode {
    const TYPE: ProtocolType;

    /// Decodes the payload of `message`, which must carry [`Self::TYPE`].
    fn from_message(message: &Message) -> Result<Self, ProtocolError> {
        if message.message_type() != Self::TYPE {
            return Err(ProtocolError::UnexpectedType {
                expected: Self::TYPE,
                actual: message.message_type(),
            });
        }
        Ok(Decoder::new(FRAME_ENDIANNESS).decode(message.payload().clone())?)
    }
}
