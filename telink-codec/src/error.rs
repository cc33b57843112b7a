//! Codec error types.

use crate::path::CodingPath;
use thiserror::Error;

/// Errors raised while encoding or decoding.
///
/// Every variant carries the [`CodingPath`] that was active when the failure
/// happened, so a caller can tell which field of a nested value was at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("insufficient data at \"{path}\": need {needed} bytes, {available} available")]
    InsufficientData {
        path: CodingPath,
        needed: usize,
        available: usize,
    },

    #[error("type mismatch at \"{path}\": could not parse {type_name} at offset {offset}")]
    TypeMismatch {
        path: CodingPath,
        type_name: &'static str,
        offset: usize,
    },

    #[error("invalid encoding at \"{path}\": {reason}")]
    InvalidEncoding { path: CodingPath, reason: String },

    #[error("value too large at \"{path}\": {size} (max {max})")]
    ValueTooLarge {
        path: CodingPath,
        size: usize,
        max: usize,
    },

    #[error("unsupported at \"{path}\": {operation}")]
    Unsupported {
        path: CodingPath,
        operation: &'static str,
    },

    #[error("recursion limit of {limit} exceeded at \"{path}\"")]
    RecursionLimit { path: CodingPath, limit: usize },
}

/// Fieldless discriminant of [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InsufficientData,
    TypeMismatch,
    InvalidEncoding,
    ValueTooLarge,
    Unsupported,
    RecursionLimit,
}

impl CodecError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::InsufficientData { .. } => ErrorKind::InsufficientData,
            CodecError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            CodecError::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
            CodecError::ValueTooLarge { .. } => ErrorKind::ValueTooLarge,
            CodecError::Unsupported { .. } => ErrorKind::Unsupported,
            CodecError::RecursionLimit { .. } => ErrorKind::RecursionLimit,
        }
    }

    /// Returns the coding path active when the error was raised.
    pub fn path(&self) -> &CodingPath {
        match self {
            CodecError::InsufficientData { path, .. }
            | CodecError::TypeMismatch { path, .. }
            | CodecError::InvalidEncoding { path, .. }
            | CodecError::ValueTooLarge { path, .. }
            | CodecError::Unsupported { path, .. }
            | CodecError::RecursionLimit { path, .. } => path,
        }
    }

    /// Returns whether retrying against a longer buffer may succeed.
    ///
    /// Only a short buffer is recoverable; streaming callers typically wait
    /// for more bytes and decode again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CodecError::InsufficientData { .. })
    }
}
