//! # Shared Ledger Handle
//!
//! A cloneable, thread-safe handle to one [`EscrowLedger`]. Every operation
//! runs entirely under a single lock acquisition, so concurrent calls against
//! the same bill are applied one at a time.
//!
//! The lock is `parking_lot`, which does not poison: a panic inside one
//! operation does not wedge the ledger for other callers.

use std::sync::Arc;

use parking_lot::Mutex;
use splitbill_core::{BillAddress, Identity};

use crate::auth::{Authenticated, CallerVerifier};
use crate::bill::Bill;
use crate::error::EscrowError;
use crate::instruction::SignedInstruction;
use crate::ledger::{EscrowLedger, InstructionOutcome};
use crate::receipt::WithdrawalReceipt;
use crate::transfer::TokenTransfer;

/// Thread-safe, cloneable handle to an [`EscrowLedger`].
#[derive(Debug)]
pub struct SharedEscrowLedger<T: TokenTransfer> {
    inner: Arc<Mutex<EscrowLedger<T>>>,
}

impl<T: TokenTransfer> Clone for SharedEscrowLedger<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: TokenTransfer> From<EscrowLedger<T>> for SharedEscrowLedger<T> {
    fn from(ledger: EscrowLedger<T>) -> Self {
        Self::new(ledger)
    }
}

impl<T: TokenTransfer> SharedEscrowLedger<T> {
    /// Wrap a ledger for shared use.
    pub fn new(ledger: EscrowLedger<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` against a read-only view of the ledger under the lock.
    ///
    /// Mutation goes through the operation methods only.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&EscrowLedger<T>) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard)
    }

    /// See [`EscrowLedger::initialize_split`].
    pub fn initialize_split(
        &self,
        caller: &Authenticated,
        bill_name: &str,
        total_amount: u64,
        receiver: Identity,
    ) -> Result<Bill, EscrowError> {
        self.inner
            .lock()
            .initialize_split(caller, bill_name, total_amount, receiver)
    }

    /// See [`EscrowLedger::contribute`].
    pub fn contribute(
        &self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
        amount: u64,
    ) -> Result<Bill, EscrowError> {
        self.inner
            .lock()
            .contribute(caller, creator, bill_name, amount)
    }

    /// See [`EscrowLedger::withdraw`].
    pub fn withdraw(
        &self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
    ) -> Result<WithdrawalReceipt, EscrowError> {
        self.inner.lock().withdraw(caller, creator, bill_name)
    }

    /// See [`EscrowLedger::close`].
    pub fn close(
        &self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
    ) -> Result<Bill, EscrowError> {
        self.inner.lock().close(caller, creator, bill_name)
    }

    /// See [`EscrowLedger::process`].
    pub fn process<V: CallerVerifier>(
        &self,
        verifier: &V,
        signed: &SignedInstruction,
    ) -> Result<InstructionOutcome, EscrowError> {
        self.inner.lock().process(verifier, signed)
    }

    /// A snapshot of the bill `(creator, bill_name)`.
    pub fn bill(&self, creator: &Identity, bill_name: &str) -> Option<Bill> {
        self.inner.lock().bill(creator, bill_name).cloned()
    }

    /// A snapshot of the bill at `address`.
    pub fn bill_at(&self, address: &BillAddress) -> Option<Bill> {
        self.inner.lock().bill_at(address).cloned()
    }

    /// Balance of the bill's custodial account.
    pub fn custody_balance(&self, address: &BillAddress) -> u64 {
        self.inner.lock().custody_balance(address)
    }
}
