//! # Escrow Error Types
//!
//! Every ledger operation fails with an [`EscrowError`]. A failed operation
//! never leaves a partial mutation behind: the bill record, the contributor
//! log and the token balances are exactly as they were before the call.

use splitbill_core::{CanonicalizationError, CryptoError, ValidationError};
use thiserror::Error;

use crate::transfer::TransferError;

/// Errors raised by the escrow ledger.
#[derive(Error, Debug)]
pub enum EscrowError {
    /// Amounts must be strictly positive.
    #[error("invalid amount {amount}: must be greater than zero")]
    InvalidAmount {
        /// The rejected amount.
        amount: u64,
    },

    /// The bill name failed validation.
    #[error(transparent)]
    InvalidBillName(#[from] ValidationError),

    /// A bill already occupies the derived address.
    #[error("bill {address} already exists")]
    DuplicateBill {
        /// The derived bill address.
        address: String,
    },

    /// No bill exists at the derived address.
    #[error("bill {address} not found")]
    BillNotFound {
        /// The derived bill address.
        address: String,
    },

    /// The bill has reached its target and accepts no more contributions.
    #[error("bill {address} is already settled (status {status})")]
    BillAlreadySettled {
        /// The bill address.
        address: String,
        /// The current bill status.
        status: String,
    },

    /// The contribution would push the collected total past the target.
    #[error(
        "contribution of {amount} to bill {address} exceeds the target: collected {collected} of {total}"
    )]
    ExcessContribution {
        /// The bill address.
        address: String,
        /// The rejected contribution amount.
        amount: u64,
        /// Amount collected so far.
        collected: u64,
        /// The bill's fixed target.
        total: u64,
    },

    /// The contributor log is full.
    #[error("bill {address} has reached its limit of {limit} contributions")]
    ContributorLimitReached {
        /// The bill address.
        address: String,
        /// The configured maximum number of entries.
        limit: usize,
    },

    /// The identity already contributed and repeat contributions are disabled.
    #[error("{contributor} has already contributed to bill {address}")]
    DuplicateContributor {
        /// The bill address.
        address: String,
        /// The contributor identity (hex).
        contributor: String,
    },

    /// The caller is not the bill's authority.
    #[error("{caller} is not the authority of bill {address}")]
    Unauthorized {
        /// The bill address.
        address: String,
        /// The rejected caller identity (hex).
        caller: String,
    },

    /// Withdrawal requested before the target was reached.
    #[error("bill {address} is not settled (status {status})")]
    NotSettled {
        /// The bill address.
        address: String,
        /// The current bill status.
        status: String,
    },

    /// The settled funds have already been released.
    #[error("bill {address} has already been withdrawn")]
    AlreadyWithdrawn {
        /// The bill address.
        address: String,
    },

    /// Close requested while the bill still holds or awaits funds.
    #[error("bill {address} cannot be closed in status {status}")]
    BillStillActive {
        /// The bill address.
        address: String,
        /// The current bill status.
        status: String,
    },

    /// A persisted bill record violates the bill invariants.
    #[error("corrupt bill record {address}: {reason}")]
    CorruptRecord {
        /// The address stored in the record.
        address: String,
        /// Which invariant failed.
        reason: String,
    },

    /// The signature on an instruction did not verify.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(#[from] CryptoError),

    /// The instruction names an acting identity other than its signer.
    #[error("instruction acts as {expected} but was signed by {signer}")]
    SignerMismatch {
        /// The identity named in the instruction (hex).
        expected: String,
        /// The identity that signed it (hex).
        signer: String,
    },

    /// The nonce was not greater than the signer's last accepted nonce.
    #[error("stale nonce {nonce} for {signer}: last accepted was {last}")]
    StaleNonce {
        /// The signer identity (hex).
        signer: String,
        /// The rejected nonce.
        nonce: u64,
        /// The last accepted nonce.
        last: u64,
    },

    /// An instruction or receipt could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The token-transfer capability rejected the movement of funds.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}
