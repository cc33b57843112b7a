//! Device addresses.
//!
//! Both address types keep their bytes in display (big-endian) order and
//! follow the engine's byte order on the wire.

use crate::error::ProtocolError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use telink_codec::{
    CodecError, CustomDecode, CustomDecodingContainer, CustomEncode, CustomEncodingContainer,
    Endianness,
};

/// Writes `bytes` as colon-separated upper-case hex.
fn fmt_colon_hex(bytes: &[u8], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            f.write_str(":")?;
        }
        write!(f, "{:02X}", byte)?;
    }
    Ok(())
}

/// Parses `N` colon-separated two-digit hex bytes.
fn parse_colon_hex<const N: usize>(s: &str) -> Result<[u8; N], ProtocolError> {
    let invalid = || ProtocolError::InvalidAddress(s.to_string());
    if s.len() != N * 3 - 1 {
        return Err(invalid());
    }
    let mut bytes = [0u8; N];
    let mut components = s.split(':');
    for byte in bytes.iter_mut() {
        let component = components.next().ok_or_else(invalid)?;
        if component.len() != 2 || !component.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        *byte = u8::from_str_radix(component, 16).map_err(|_| invalid())?;
    }
    if components.next().is_some() {
        return Err(invalid());
    }
    Ok(bytes)
}

/// Reads `N` bytes in the engine's byte order.
fn decode_ordered<const N: usize>(
    container: &mut CustomDecodingContainer<'_>,
) -> Result<[u8; N], CodecError> {
    let mut bytes: [u8; N] = container.decode_map(N, |data| data.try_into().ok())?;
    if container.endianness() == Endianness::Little {
        bytes.reverse();
    }
    Ok(bytes)
}

/// Writes `bytes` in the engine's byte order.
fn encode_ordered<const N: usize>(
    bytes: [u8; N],
    container: &mut CustomEncodingContainer<'_>,
) -> Result<(), CodecError> {
    let mut ordered = bytes;
    if container.endianness() == Endianness::Little {
        ordered.reverse();
    }
    container.encode_bytes(&ordered)
}

/// Four-byte address carried in Telink advertisements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 4]);

impl Address {
    pub const LENGTH: usize = 4;
    pub const MIN: Address = Address([0x00; 4]);
    pub const MAX: Address = Address([0xFF; 4]);
    pub const ZERO: Address = Address::MIN;

    /// Creates an address from bytes in display order.
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(data: &[u8]) -> Option<Self> {
        data.try_into().ok().map(Self)
    }

    pub fn bytes(&self) -> [u8; 4] {
        self.0
    }

    pub fn byte_swapped(&self) -> Self {
        let mut bytes = self.0;
        bytes.reverse();
        Self(bytes)
    }
}

impl From<BluetoothAddress> for Address {
    /// Keeps the low four bytes of the device address.
    fn from(address: BluetoothAddress) -> Self {
        let bytes = address.bytes();
        Self([bytes[2], bytes[3], bytes[4], bytes[5]])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_colon_hex(&self.0, f)
    }
}

impl FromStr for Address {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_colon_hex(s).map(Self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

impl CustomEncode for Address {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError> {
        encode_ordered(self.0, container)
    }
}

impl CustomDecode for Address {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
        decode_ordered(container).map(Self)
    }
}

/// Six-byte Bluetooth device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BluetoothAddress([u8; 6]);

impl BluetoothAddress {
    pub const LENGTH: usize = 6;
    pub const ZERO: BluetoothAddress = BluetoothAddress([0x00; 6]);

    /// Creates an address from bytes in display order.
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for BluetoothAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_colon_hex(&self.0, f)
    }
}

impl FromStr for BluetoothAddress {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_colon_hex(s).map(Self)
    }
}

impl Serialize for BluetoothAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BluetoothAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

impl CustomEncode for BluetoothAddress {
    fn encode_custom(&self, container: &mut CustomEncodingContainer<'_>) -> Result<(), CodecError> {
        encode_ordered(self.0, container)
    }
}

impl CustomDecode for BluetoothAddress {
    fn decode_custom(container: &mut CustomDecodingContainer<'_>) -> Result<Self, CodecError> {
        decode_ordered(container).map(Self)
    }
}
