//! Primitive codec table.
//!
//! Every fixed-width primitive has a byte length and a conversion to and from
//! raw bytes. Multi-byte values honour an explicit [`Endianness`]; floating
//! point values travel as the IEEE-754 bit pattern of the unsigned integer
//! of the same width. A boolean is a single byte, `0` or `1`.

use bytes::BufMut;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Byte order of a multi-byte value on the wire.
///
/// There is no crate-wide default: wire formats in the same system use
/// opposite orders for different fields, so every call site chooses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn from_little_endian(little_endian: bool) -> Self {
        if little_endian {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    pub fn is_little_endian(self) -> bool {
        self == Endianness::Little
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => write!(f, "little"),
            Endianness::Big => write!(f, "big"),
        }
    }
}

impl FromStr for Endianness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Endianness::Little),
            "big" | "be" => Ok(Endianness::Big),
            other => Err(format!("unknown byte order: {}", other)),
        }
    }
}

/// A fixed-width value with a raw byte representation.
pub trait Primitive: Copy + Sized {
    /// Number of bytes the value occupies on the wire.
    const BYTE_LENGTH: usize;

    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Parses the value from exactly [`Self::BYTE_LENGTH`] bytes.
    ///
    /// Returns `None` on a length mismatch or an invalid bit pattern.
    fn from_bytes(data: &[u8], endianness: Endianness) -> Option<Self>;

    /// Appends the raw representation to `buf`.
    fn write_bytes<B: BufMut>(self, buf: &mut B, endianness: Endianness);

    fn to_bytes(self, endianness: Endianness) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::BYTE_LENGTH);
        self.write_bytes(&mut buf, endianness);
        buf
    }
}

macro_rules! integer_primitive {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const BYTE_LENGTH: usize = std::mem::size_of::<$ty>();
                const NAME: &'static str = stringify!($ty);

                fn from_bytes(data: &[u8], endianness: Endianness) -> Option<Self> {
                    let raw: [u8; std::mem::size_of::<$ty>()] = data.try_into().ok()?;
                    Some(match endianness {
                        Endianness::Little => $ty::from_le_bytes(raw),
                        Endianness::Big => $ty::from_be_bytes(raw),
                    })
                }

                fn write_bytes<B: BufMut>(self, buf: &mut B, endianness: Endianness) {
                    match endianness {
                        Endianness::Little => buf.put_slice(&self.to_le_bytes()),
                        Endianness::Big => buf.put_slice(&self.to_be_bytes()),
                    }
                }
            }
        )*
    };
}

macro_rules! float_primitive {
    ($($ty:ident => $bits:ident),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const BYTE_LENGTH: usize = <$bits as Primitive>::BYTE_LENGTH;
                const NAME: &'static str = stringify!($ty);

                fn from_bytes(data: &[u8], endianness: Endianness) -> Option<Self> {
                    <$bits as Primitive>::from_bytes(data, endianness).map($ty::from_bits)
                }

                fn write_bytes<B: BufMut>(self, buf: &mut B, endianness: Endianness) {
                    self.to_bits().write_bytes(buf, endianness);
                }
            }
        )*
    };
}

integer_primitive!(u8, u16, u32, u64, i8, i16, i32, i64);
float_primitive!(f32 => u32, f64 => u64);

impl Primitive for bool {
    const BYTE_LENGTH: usize = 1;
    const NAME: &'static str = "bool";

    fn from_bytes(data: &[u8], endianness: Endianness) -> Option<Self> {
        match u8::from_bytes(data, endianness)? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        }
    }

    fn write_bytes<B: BufMut>(self, buf: &mut B, endianness: Endianness) {
        u8::from(self).write_bytes(buf, endianness);
    }
}
