//! NDR error types

use thiserror::Error;

/// Largest number of elements a single conformant array may declare.
pub const MAX_NDR_ARRAY_ELEMENTS: usize = 1 << 20;

/// Largest number of bytes a single decoded allocation may request.
pub const MAX_NDR_ALLOCATION_SIZE: usize = 16 * 1024 * 1024;

/// NDR encoding/decoding errors
#[derive(Debug, Error)]
pub enum NdrError {
    /// Buffer underflow - not enough data
    #[error("buffer underflow: needed {needed} bytes, have {have}")]
    BufferUnderflow { needed: usize, have: usize },

    /// Invalid string - not null terminated or invalid encoding
    #[error("invalid string: {0}")]
    InvalidString(String),

    /// A deferred pointee was requested but no referent was queued for it
    #[error("invalid pointer: {0}")]
    InvalidPointer(String),

    /// Referents read in a unit's fixed part were never followed by their pointees
    #[error("{0} referent(s) left without a pointee")]
    UnconsumedReferents(usize),

    /// Array size mismatch
    #[error("array size mismatch: expected {expected}, got {got}")]
    ArraySizeMismatch { expected: usize, got: usize },

    /// Invalid discriminant for union
    #[error("invalid union discriminant {value} for {union}")]
    InvalidDiscriminant { union: &'static str, value: u16 },

    /// Invalid enum value
    #[error("invalid value {value} for enum {name}")]
    InvalidEnumValue { name: &'static str, value: u16 },

    /// Conformance mismatch
    #[error("conformance mismatch: max_count={max_count}, actual_count={actual_count}")]
    ConformanceMismatch { max_count: u32, actual_count: u32 },

    /// A decoded length asks for more memory than the runtime permits
    #[error("allocation of {requested} exceeds limit of {limit}")]
    AllocationLimitExceeded { requested: usize, limit: usize },

    /// A length does not fit its 32-bit wire representation
    #[error("integer overflow while sizing NDR data")]
    IntegerOverflow,

    /// UTF-16 decoding error
    #[error("UTF-16 error: {0}")]
    Utf16Error(#[from] std::char::DecodeUtf16Error),
}

/// Result type for NDR operations
pub type Result<T> = std::result::Result<T, NdrError>;
