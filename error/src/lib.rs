/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the error taxonomy shared by the key store, the
    attestation service and the driver models.

--*/
#![cfg_attr(not(feature = "std"), no_std)]
use core::fmt;

/// Errors raised by the persistent storage engine.
///
/// These are passed through the key store contract untouched since the
/// storage engine is an external collaborator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StorageError {
    /// Namespace has not been opened
    NotInitialized,

    /// Requested entry does not exist in the partition
    NotFound,

    /// No space left in the partition
    PartitionFull,

    /// Entry failed to decrypt or authenticate with the namespace keys
    Corrupted,

    /// Entry name or value exceeds the engine limits
    ValueTooLong,
}

/// TEE Error Type
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TeeError {
    /// Argument is missing or malformed
    InvalidArgument,

    /// Buffer or length is out of the accepted range
    InvalidSize,

    /// Key type mismatch, write-once violation or key already present
    InvalidState,

    /// Key or fuse block not found
    NotFound,

    /// Operation or curve not available on this SoC
    NotSupported,

    /// Allocation failed
    NoMemory,

    /// Storage engine failure
    Storage(StorageError),
}

pub type TeeResult<T> = Result<T, TeeError>;

/// Defines the stable numeric codes of the error taxonomy.
///
/// This macro takes a list of (pattern, value, doc) tuples and generates the
/// two way mapping between the enum and its `u32` wire code.
macro_rules! define_error_codes {
    ($(($variant:pat, $value:expr, $doc:expr)),* $(,)?) => {
        impl TeeError {
            /// Stable numeric code of the error
            pub const fn code(&self) -> u32 {
                match self {
                    $($variant => $value,)*
                }
            }

            /// Human readable description of the error
            pub const fn description(&self) -> &'static str {
                match self {
                    $($variant => $doc,)*
                }
            }
        }

        #[cfg(test)]
        /// Returns every defined error code for testing uniqueness
        pub fn all_codes() -> Vec<(&'static str, u32)> {
            vec![$(($doc, $value),)*]
        }
    };
}

define_error_codes![
    (TeeError::NoMemory, 0x0101, "Out of memory"),
    (TeeError::InvalidArgument, 0x0102, "Invalid argument"),
    (TeeError::InvalidState, 0x0103, "Invalid state"),
    (TeeError::InvalidSize, 0x0104, "Invalid size"),
    (TeeError::NotFound, 0x0105, "Not found"),
    (TeeError::NotSupported, 0x0106, "Not supported"),
    (
        TeeError::Storage(StorageError::NotInitialized),
        0x1101,
        "Storage namespace not initialized"
    ),
    (
        TeeError::Storage(StorageError::NotFound),
        0x1102,
        "Storage entry not found"
    ),
    (
        TeeError::Storage(StorageError::PartitionFull),
        0x1103,
        "Storage partition full"
    ),
    (
        TeeError::Storage(StorageError::Corrupted),
        0x1104,
        "Storage entry corrupted or keys mismatched"
    ),
    (
        TeeError::Storage(StorageError::ValueTooLong),
        0x1105,
        "Storage name or value too long"
    ),
];

impl From<StorageError> for TeeError {
    fn from(val: StorageError) -> Self {
        TeeError::Storage(val)
    }
}

impl From<TeeError> for u32 {
    fn from(val: TeeError) -> Self {
        val.code()
    }
}

impl TryFrom<u32> for TeeError {
    type Error = u32;

    fn try_from(val: u32) -> Result<Self, u32> {
        const ALL: [TeeError; 11] = [
            TeeError::NoMemory,
            TeeError::InvalidArgument,
            TeeError::InvalidState,
            TeeError::InvalidSize,
            TeeError::NotFound,
            TeeError::NotSupported,
            TeeError::Storage(StorageError::NotInitialized),
            TeeError::Storage(StorageError::NotFound),
            TeeError::Storage(StorageError::PartitionFull),
            TeeError::Storage(StorageError::Corrupted),
            TeeError::Storage(StorageError::ValueTooLong),
        ];
        ALL.into_iter().find(|err| err.code() == val).ok_or(val)
    }
}

impl fmt::Display for TeeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:x})", self.description(), self.code())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TeeError {}
