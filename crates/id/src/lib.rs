//! Time-ordered metadata identifiers and date-partition utilities.
//!
//! Every submitted payment-metadata document is keyed by a 26-character identifier derived
//! from a version-7 UUID. The 128-bit value is written in base 32 using the Crockford-style
//! alphabet `0123456789ABCDEFGHJKMNPQRSTVWXYZ`, most significant digit first.
//!
//! ## Canonical identifier form
//! - Length: 26
//! - Characters: the upper-case alphabet above only (no `I`, `L`, `O`, `U`)
//! - Byte 6 of the big-endian value carries the UUID version nibble `7`
//! - Example: `01HF7YAT00FAY828T5CY4TQKFF`
//!
//! Because the 48-bit millisecond timestamp sits in the most significant bits, the string
//! form sorts lexicographically in creation order. The first 10 characters encode exactly
//! that timestamp.
//!
//! ## Date partitions
//! Documents are grouped by the UTC calendar day of the embedded timestamp:
//! `YYYY/MM/DD/<identifier>.json`
//!
//! Example:
//! `2023/11/14/01HF7YAT00FAY828T5CY4TQKFF.json`
//!
//! The partition is derived from the identifier alone, never from document content.

mod codec;
mod id;

pub use codec::{decode, encode, generate, timestamp_of, validate, ALPHABET, ID_LEN};
pub use id::MetadataId;

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    /// A symbol outside the base-32 alphabet was found
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },

    /// The decoded value does not fit in 128 bits
    #[error("identifier value overflows 128 bits")]
    Overflow,

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedded timestamp cannot be represented as a calendar date
    #[error("timestamp out of range: {0} ms")]
    TimestampOutOfRange(i64),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
