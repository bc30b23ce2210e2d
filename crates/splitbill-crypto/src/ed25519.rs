//! # Ed25519 Signing and Verification
//!
//! A party's [`Identity`] is its Ed25519 public key, so verifying a
//! signature against an identity proves the identity authorized the payload.
//!
//! ## Security Invariant
//!
//! - Signing and verification take `&CanonicalBytes`, never raw bytes.
//! - `Ed25519KeyPair` does not implement `Serialize` and its `Debug` output
//!   never includes key material.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use splitbill_core::encoding::{hex_prefix, hex_to_array, to_hex};
use splitbill_core::{CanonicalBytes, CryptoError, Identity};

/// An Ed25519 signature (64 bytes). Serializes as a hex string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

/// An Ed25519 key pair held by a party.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render the signature as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse a signature from a 128-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        hex_to_array("signature", hex)
            .map(Self)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte private seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// The identity (public key) of this key pair.
    pub fn identity(&self) -> Identity {
        Identity::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

/// Verify that `identity` signed `data`.
///
/// Fails with [`CryptoError::KeyError`] if the identity bytes are not a valid
/// Ed25519 point, and [`CryptoError::VerificationFailed`] if the signature
/// does not match.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    identity: &Identity,
) -> Result<(), CryptoError> {
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(identity.as_bytes())
        .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(value: serde_json::Value) -> CanonicalBytes {
        CanonicalBytes::new(&value).unwrap()
    }

    #[test]
    fn sign_and_verify() {
        let kp = Ed25519KeyPair::generate();
        let data = canonical(serde_json::json!({"bill": "dinner", "amount": 500}));
        let sig = kp.sign(&data);
        verify(&data, &sig, &kp.identity()).expect("valid signature should verify");
    }

    #[test]
    fn verify_wrong_identity_fails() {
        let kp1 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let data = canonical(serde_json::json!({"test": true}));
        let sig = kp1.sign(&data);
        assert!(matches!(
            verify(&data, &sig, &kp2.identity()),
            Err(CryptoError::VerificationFailed(_))
        ));
    }

    #[test]
    fn verify_tampered_message_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&canonical(serde_json::json!({"amount": 500})));
        let tampered = canonical(serde_json::json!({"amount": 5000}));
        assert!(verify(&tampered, &sig, &kp.identity()).is_err());
    }

    #[test]
    fn deterministic_from_seed() {
        let kp1 = Ed25519KeyPair::from_seed(&[42u8; 32]);
        let kp2 = Ed25519KeyPair::from_seed(&[42u8; 32]);
        assert_eq!(kp1.identity(), kp2.identity());
        let data = canonical(serde_json::json!({"x": 1}));
        assert_eq!(kp1.sign(&data), kp2.sign(&data));
    }

    #[test]
    fn signature_serde_is_hex() {
        let kp = Ed25519KeyPair::from_seed(&[1u8; 32]);
        let sig = kp.sign(&canonical(serde_json::json!({"y": 2})));
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json.len(), 128 + 2);
        let back: Ed25519Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn signature_invalid_hex() {
        assert!(Ed25519Signature::from_hex("aabb").is_err());
        assert!(Ed25519Signature::from_hex(&"zz".repeat(64)).is_err());
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
    }
}
