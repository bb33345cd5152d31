// Licensed under the Apache-2.0 license

//! Error type for EAT section encoding

use tee_error::TeeError;

/// Error type for EAT section and token encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EatError {
    /// Destination buffer cannot hold the token
    BufferTooSmall,
    /// Encoded section exceeds its byte cap
    SectionTooLarge,
    /// Claim value cannot be represented
    InvalidData,
    /// JSON serialization failed
    EncodingError,
}

impl From<EatError> for TeeError {
    fn from(err: EatError) -> Self {
        match err {
            EatError::BufferTooSmall | EatError::SectionTooLarge => TeeError::InvalidSize,
            EatError::InvalidData => TeeError::InvalidArgument,
            EatError::EncodingError => TeeError::InvalidState,
        }
    }
}

impl From<serde_json::Error> for EatError {
    fn from(_: serde_json::Error) -> Self {
        EatError::EncodingError
    }
}
