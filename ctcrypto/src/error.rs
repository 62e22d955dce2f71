//! Error type for operations on public data.
//!
//! Secret-dependent outcomes (the RSA fault check, padding validity) never
//! surface here: they collapse into a single `bool` / `Option` at the API
//! boundary so that callers cannot tell them apart.

/// Errors reported while validating keys, parameters and inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Key material is malformed or inconsistent.
    #[error("invalid RSA key: {0}")]
    InvalidKey(&'static str),
    /// FORS parameters outside the supported range.
    #[error("invalid FORS parameters: {0}")]
    InvalidParams(&'static str),
    /// The message does not fit in one PKCS#1 encryption block.
    #[error("message too long for the key size")]
    MessageTooLong,
    /// No suitable prime was found within the retry budget.
    #[error("key generation failed")]
    KeyGeneration,
}

pub type Result<T> = core::result::Result<T, Error>;
