//! # Caller Authentication
//!
//! Every ledger operation takes an [`Authenticated`] caller. A host that
//! verifies signers itself (for example, a runtime that already checked the
//! transaction signature) vouches for the identity with
//! [`Authenticated::trusted`]. Otherwise a [`CallerVerifier`] derives the
//! caller from a [`SignedInstruction`].

use splitbill_core::Identity;
use splitbill_crypto::verify;

use crate::error::EscrowError;
use crate::instruction::SignedInstruction;

/// An identity whose authority over the current call has been established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated {
    identity: Identity,
}

impl Authenticated {
    /// Vouch for `identity` on the host's own authority.
    pub fn trusted(identity: Identity) -> Self {
        Self { identity }
    }

    /// The authenticated identity.
    pub fn identity(&self) -> Identity {
        self.identity
    }
}

/// Establishes who signed an instruction.
pub trait CallerVerifier {
    /// Verify `signed` and return its signer as an authenticated caller.
    fn verify(&self, signed: &SignedInstruction) -> Result<Authenticated, EscrowError>;
}

/// Verifies Ed25519 signatures over the instruction's canonical payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl CallerVerifier for Ed25519Verifier {
    fn verify(&self, signed: &SignedInstruction) -> Result<Authenticated, EscrowError> {
        let payload = signed.payload()?;
        verify(&payload, &signed.signature, &signed.signer)?;
        Ok(Authenticated::trusted(signed.signer))
    }
}
