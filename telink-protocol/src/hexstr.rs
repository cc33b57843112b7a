//! Hex text helpers shared by addresses, frames and the command line.

use crate::error::ProtocolError;
use bytes::Bytes;

/// Parses hex text such as `"55AA0009"`, `"0x55 AA"` or `"55:AA"`.
///
/// Whitespace and `:` separators are ignored.
pub fn decode_hex(input: &str) -> Result<Bytes, ProtocolError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let cleaned: String = digits
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned)
        .map(Bytes::from)
        .map_err(|err| ProtocolError::InvalidHex(format!("{:?}: {}", input, err)))
}

/// Renders bytes as contiguous upper-case hex.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode_upper(data)
}

/// Serde adapter storing [`Bytes`] as an upper-case hex string.
pub(crate) mod serde_hex {
    use bytes::Bytes;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_hex(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_hex(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_forms() {
        let expected = Bytes::from_static(&[0x55, 0xAA, 0x00, 0x09]);
        assert_eq!(decode_hex("55AA0009").unwrap(), expected);
        assert_eq!(decode_hex("0x55aa0009").unwrap(), expected);
        assert_eq!(decode_hex(" 55 AA 00 09 ").unwrap(), expected);
        assert_eq!(decode_hex("55:AA:00:09").unwrap(), expected);
        assert!(decode_hex("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_hex_rejects() {
        assert!(matches!(decode_hex("ABC"), Err(ProtocolError::InvalidHex(_))));
        assert!(matches!(decode_hex("ZZ"), Err(ProtocolError::InvalidHex(_))));
    }

    #[test]
    fn test_encode_hex_upper() {
        assert_eq!(encode_hex(&[0xff, 0x0b]), "FF0B");
    }
}
