//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use splitbill_core::{AccountId, Identity};
use splitbill_crypto::Ed25519KeyPair;
use splitbill_escrow::{Authenticated, EscrowLedger, InMemoryTokenLedger, TokenTransfer};
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// A party with a deterministic key.
pub struct Party {
    pub key: Ed25519KeyPair,
}

impl Party {
    pub fn new(seed: u8) -> Self {
        Self {
            key: Ed25519KeyPair::from_seed(&[seed; 32]),
        }
    }

    pub fn id(&self) -> Identity {
        self.key.identity()
    }

    pub fn caller(&self) -> Authenticated {
        Authenticated::trusted(self.id())
    }

    pub fn wallet(&self) -> AccountId {
        AccountId::Wallet(self.id())
    }
}

/// A ledger whose parties each hold `balance` tokens.
pub fn ledger_with(parties: &[&Party], balance: u64) -> EscrowLedger<InMemoryTokenLedger> {
    let mut tokens = InMemoryTokenLedger::new();
    for party in parties {
        tokens.mint(party.id(), balance).unwrap();
    }
    EscrowLedger::new(tokens)
}

pub fn wallet_balance(ledger: &EscrowLedger<InMemoryTokenLedger>, party: &Party) -> u64 {
    ledger.tokens().balance(&party.wallet())
}
