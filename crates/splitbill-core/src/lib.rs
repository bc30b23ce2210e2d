#![deny(missing_docs)]

//! # splitbill-core: Foundational Types for the Split-Bill Escrow Ledger
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies, only `serde`, `serde_json`, `thiserror`, `chrono`, and
//! `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtypes for domain primitives.** An [`Identity`] is not a
//!    [`BillAddress`], and a [`BillName`] is validated once at construction.
//!
//! 2. **The address is the index.** [`derive_bill_address`] is the only way
//!    to locate a bill, for creation and lookup alike.
//!
//! 3. **[`CanonicalBytes`] is the sole signing and digest input.** Signed
//!    instructions and receipts are hashed from canonical JSON only.

pub mod address;
pub mod canonical;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod identity;
pub mod temporal;

pub use address::{derive_bill_address, AccountId, BillAddress, BILL_ADDRESS_DOMAIN};
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, Sha256Accumulator};
pub use error::{CanonicalizationError, CryptoError, ValidationError};
pub use identity::{BillName, Identity};
pub use temporal::Timestamp;
