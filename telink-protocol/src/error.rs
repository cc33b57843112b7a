//! Protocol error types.

use crate::advertisement::CompanyIdentifier;
use crate::message::ProtocolType;
use telink_codec::CodecError;
use thiserror::Error;

/// Errors raised while building, parsing or validating Telink messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("frame length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch { declared: u16, actual: usize },

    #[error("unexpected vendor: expected {expected}, got {actual}")]
    UnexpectedVendor {
        expected: CompanyIdentifier,
        actual: CompanyIdentifier,
    },

    #[error("unexpected message type: expected {expected}, got {actual}")]
    UnexpectedType {
        expected: ProtocolType,
        actual: ProtocolType,
    },

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("value out of range: {value} (max {max})")]
    OutOfRange { value: u32, max: u32 },

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl ProtocolError {
    /// Returns whether more input could turn this failure into a success.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProtocolError::Codec(err) if err.is_retryable())
    }
}
