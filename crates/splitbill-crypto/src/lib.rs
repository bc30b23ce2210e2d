//! # splitbill-crypto: Signatures for the Split-Bill Escrow Ledger
//!
//! Ed25519 key pairs and verification. Every signed payload is
//! [`CanonicalBytes`](splitbill_core::CanonicalBytes), and every verifying
//! key is a party [`Identity`](splitbill_core::Identity).

pub mod ed25519;

pub use ed25519::{verify, Ed25519KeyPair, Ed25519Signature};
