//! # Error Types
//!
//! Structured errors shared by every crate in the workspace, built with
//! `thiserror`. Each variant carries the offending input so callers can
//! report it without re-deriving context.

use thiserror::Error;

/// Validation errors for domain-primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Bill names must contain at least one byte.
    #[error("invalid bill name: must be non-empty")]
    EmptyBillName,

    /// Bill name exceeds the fixed storage width.
    #[error("invalid bill name: {len} bytes exceeds the maximum of {max}")]
    BillNameTooLong {
        /// Length of the rejected name in bytes.
        len: usize,
        /// The maximum permitted length.
        max: usize,
    },

    /// Hex input could not be decoded into a fixed-width value.
    #[error("invalid {what} hex: {reason}")]
    InvalidHex {
        /// What was being decoded (e.g. "identity").
        what: &'static str,
        /// Why decoding failed.
        reason: String,
    },
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted; amounts are integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Errors from signing and verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key parsing failed.
    #[error("key error: {0}")]
    KeyError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_name_too_long_display() {
        let err = ValidationError::BillNameTooLong { len: 64, max: 50 };
        let msg = format!("{err}");
        assert!(msg.contains("64"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn invalid_hex_display() {
        let err = ValidationError::InvalidHex {
            what: "identity",
            reason: "odd length".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("identity"));
        assert!(msg.contains("odd length"));
    }

    #[test]
    fn float_rejected_display() {
        let err = CanonicalizationError::FloatRejected(2.5);
        assert!(format!("{err}").contains("2.5"));
    }

    #[test]
    fn crypto_error_display() {
        let err = CryptoError::VerificationFailed("bad signature".to_string());
        assert!(format!("{err}").contains("bad signature"));
    }
}
