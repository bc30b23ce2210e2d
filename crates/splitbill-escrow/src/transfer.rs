//! # Token Transfer Capability
//!
//! The ledger never moves value itself. It asks a [`TokenTransfer`]
//! implementation to move `amount` between two [`AccountId`]s, and that
//! call either succeeds completely or fails without effect.
//!
//! [`InMemoryTokenLedger`] is the shipped implementation: a balance map with
//! overflow-checked, all-or-nothing transfers. Hosts backed by a real token
//! program provide their own implementation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use splitbill_core::{AccountId, Identity};
use thiserror::Error;

/// Failures reported by a token-transfer capability.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferError {
    /// The account was never opened.
    #[error("account {0} does not exist")]
    AccountNotFound(AccountId),

    /// The account is already open and still holds funds.
    #[error("account {account} is already open with balance {balance}")]
    AccountInUse {
        /// The account.
        account: AccountId,
        /// Its current balance.
        balance: u64,
    },

    /// The source account cannot cover the transfer.
    #[error("account {account} holds {available}, cannot send {requested}")]
    InsufficientFunds {
        /// The source account.
        account: AccountId,
        /// The requested amount.
        requested: u64,
        /// The available balance.
        available: u64,
    },

    /// Crediting the destination would overflow its balance.
    #[error("crediting account {account} would overflow its balance")]
    Overflow {
        /// The destination account.
        account: AccountId,
    },

    /// The account is frozen and cannot send or receive.
    #[error("account {0} is frozen")]
    AccountFrozen(AccountId),
}

/// An atomic value-transfer primitive.
pub trait TokenTransfer {
    /// Open `account` with a zero balance.
    ///
    /// Reopening an existing empty account succeeds; reopening a funded one
    /// fails with [`TransferError::AccountInUse`].
    fn open_account(&mut self, account: AccountId) -> Result<(), TransferError>;

    /// Move `amount` from `from` to `to`. All-or-nothing.
    fn transfer(&mut self, amount: u64, from: AccountId, to: AccountId)
        -> Result<(), TransferError>;

    /// Current balance of `account` (zero if it does not exist).
    fn balance(&self, account: &AccountId) -> u64;
}

/// In-process token ledger.
///
/// Wallets are created on first credit. Custodial accounts must be opened
/// explicitly before they can receive funds.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenLedger {
    balances: HashMap<AccountId, u64>,
    frozen: HashSet<AccountId>,
}

impl InMemoryTokenLedger {
    /// Create an empty token ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` new tokens to `identity`'s wallet.
    pub fn mint(&mut self, identity: Identity, amount: u64) -> Result<(), TransferError> {
        let account = AccountId::Wallet(identity);
        let current = self.balances.get(&account).copied().unwrap_or(0);
        let updated = current
            .checked_add(amount)
            .ok_or(TransferError::Overflow { account })?;
        self.balances.insert(account, updated);
        Ok(())
    }

    /// Freeze `account`: every transfer touching it fails until unfrozen.
    pub fn freeze(&mut self, account: AccountId) {
        self.frozen.insert(account);
    }

    /// Lift a freeze placed by [`freeze`](Self::freeze).
    pub fn unfreeze(&mut self, account: &AccountId) {
        self.frozen.remove(account);
    }

    /// Sum of all balances. Transfers never change it; only minting does.
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| u128::from(*b)).sum()
    }
}

impl TokenTransfer for InMemoryTokenLedger {
    fn open_account(&mut self, account: AccountId) -> Result<(), TransferError> {
        if self.frozen.contains(&account) {
            return Err(TransferError::AccountFrozen(account));
        }
        match self.balances.get(&account) {
            Some(&balance) if balance > 0 => Err(TransferError::AccountInUse { account, balance }),
            _ => {
                self.balances.insert(account, 0);
                Ok(())
            }
        }
    }

    fn transfer(
        &mut self,
        amount: u64,
        from: AccountId,
        to: AccountId,
    ) -> Result<(), TransferError> {
        for account in [from, to] {
            if self.frozen.contains(&account) {
                return Err(TransferError::AccountFrozen(account));
            }
        }
        let available = *self
            .balances
            .get(&from)
            .ok_or(TransferError::AccountNotFound(from))?;
        let to_balance = match (self.balances.get(&to), to) {
            (Some(&b), _) => b,
            (None, AccountId::Wallet(_)) => 0,
            (None, AccountId::Custody(_)) => return Err(TransferError::AccountNotFound(to)),
        };
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                account: from,
                requested: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = to_balance
            .checked_add(amount)
            .ok_or(TransferError::Overflow { account: to })?;

        self.balances.insert(from, available - amount);
        self.balances.insert(to, credited);
        Ok(())
    }

    fn balance(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }
}
