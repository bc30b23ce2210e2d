//! # Signed Instructions
//!
//! The serialized form of a ledger call. A [`SignedInstruction`] carries the
//! instruction, the signer's identity, a per-signer nonce, and an Ed25519
//! signature over the canonical JSON of the first three.

use serde::{Deserialize, Serialize};
use splitbill_core::{CanonicalBytes, CanonicalizationError, Identity};
use splitbill_crypto::{Ed25519KeyPair, Ed25519Signature};

/// One ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Create a bill owned by `creator`.
    InitializeSplit {
        /// The creating identity; must be the signer.
        creator: Identity,
        /// Label of the new bill.
        bill_name: String,
        /// Fixed target.
        total_amount: u64,
        /// Who receives the settled funds.
        receiver: Identity,
    },
    /// Pay into an open bill.
    Contribute {
        /// Creator of the bill.
        creator: Identity,
        /// Label of the bill.
        bill_name: String,
        /// The paying identity; must be the signer.
        contributor: Identity,
        /// Amount to contribute.
        amount: u64,
    },
    /// Release a settled bill's funds. The signer must be the bill's authority.
    Withdraw {
        /// Creator of the bill.
        creator: Identity,
        /// Label of the bill.
        bill_name: String,
    },
    /// Remove a withdrawn bill. The signer must be the bill's authority.
    Close {
        /// Creator of the bill.
        creator: Identity,
        /// Label of the bill.
        bill_name: String,
    },
}

impl Instruction {
    /// The identity the instruction claims to act as, where it names one.
    pub fn acting_identity(&self) -> Option<Identity> {
        match self {
            Self::InitializeSplit { creator, .. } => Some(*creator),
            Self::Contribute { contributor, .. } => Some(*contributor),
            Self::Withdraw { .. } | Self::Close { .. } => None,
        }
    }

    /// Short operation name for logs.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::InitializeSplit { .. } => "initialize_split",
            Self::Contribute { .. } => "contribute",
            Self::Withdraw { .. } => "withdraw",
            Self::Close { .. } => "close",
        }
    }
}

#[derive(Serialize)]
struct SigningPayload<'a> {
    instruction: &'a Instruction,
    signer: &'a Identity,
    nonce: u64,
}

/// An instruction authorized by its signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInstruction {
    /// The operation.
    pub instruction: Instruction,
    /// The signing identity.
    pub signer: Identity,
    /// Strictly increasing per signer.
    pub nonce: u64,
    /// Ed25519 signature over [`payload`](Self::payload).
    pub signature: Ed25519Signature,
}

impl SignedInstruction {
    /// Sign `instruction` with `key` at `nonce`.
    pub fn sign(
        instruction: Instruction,
        key: &Ed25519KeyPair,
        nonce: u64,
    ) -> Result<Self, CanonicalizationError> {
        let signer = key.identity();
        let payload = signing_payload(&instruction, &signer, nonce)?;
        let signature = key.sign(&payload);
        Ok(Self {
            instruction,
            signer,
            nonce,
            signature,
        })
    }

    /// The canonical bytes the signature covers.
    pub fn payload(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        signing_payload(&self.instruction, &self.signer, self.nonce)
    }
}

fn signing_payload(
    instruction: &Instruction,
    signer: &Identity,
    nonce: u64,
) -> Result<CanonicalBytes, CanonicalizationError> {
    CanonicalBytes::new(&SigningPayload {
        instruction,
        signer,
        nonce,
    })
}
