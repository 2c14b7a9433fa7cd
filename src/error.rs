//! Typed errors raised by the identification and repair engine.
//!
//! Binary-facing code wraps these in `anyhow` with context; library callers can
//! match on the variants directly.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A category name outside artifact, hero, trait and genre.
    #[error("invalid category '{0}' (expected artifact, hero, trait or genre)")]
    InvalidCategory(String),

    /// A signature string that is not a usable hexadecimal bit pattern.
    #[error("invalid signature '{hex}': {reason}")]
    InvalidSignature { hex: String, reason: String },

    /// Two signatures of different bit widths were compared.
    #[error("cannot compare a {left}-bit signature with a {right}-bit signature")]
    SignatureWidthMismatch { left: u32, right: u32 },

    /// A hash grid that cannot be represented.
    #[error("unsupported hash size {0} (grid must hold between 1 and 128 bits)")]
    UnsupportedHashSize(u32),
}
