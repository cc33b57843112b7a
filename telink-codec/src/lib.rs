//! # telink-codec
//!
//! Binary codec for Telink devices.
//!
//! Values are written to and read from compact, offset-addressed byte
//! buffers in one of two modes:
//!
//! - **Automatic**: fields follow one another in declaration order, each a
//!   fixed-width primitive (in the engine's byte order) or a length-prefixed
//!   string. Aggregates opt in with [`keyed_codable!`].
//! - **Manual**: a type implements [`CustomEncode`] / [`CustomDecode`] and
//!   controls every byte through a custom container, including byte order,
//!   length prefixes, padding and lookahead.
//!
//! The two modes nest freely. Errors carry the [`CodingPath`] of the field
//! that failed.

pub mod codable;
pub mod cursor;
pub mod custom;
pub mod decoder;
pub mod encoder;
pub mod error;
mod macros;
pub mod path;
pub mod primitive;

pub use codable::{CustomDecode, CustomEncode, Decode, Encode};
pub use cursor::{ReadCursor, WriteCursor};
pub use custom::{CustomDecodingContainer, CustomEncodingContainer};
pub use decoder::{
    Decoder, DecoderEngine, KeyedDecodingContainer, SingleValueDecodingContainer,
    UnkeyedDecodingContainer,
};
pub use encoder::{
    Encoder, EncoderEngine, KeyedEncodingContainer, SingleValueEncodingContainer,
    UnkeyedEncodingContainer,
};
pub use error::{CodecError, ErrorKind};
pub use path::{CodingPath, FieldKey};
pub use primitive::{Endianness, Primitive};

/// Longest string a one-byte length prefix can describe.
pub const MAX_STRING_LENGTH: usize = 255;

/// Most elements an unkeyed container can hold.
pub const MAX_UNKEYED_ELEMENTS: usize = 255;

/// Default nesting ceiling for encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 64;
