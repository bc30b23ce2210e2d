//! # Escrow Ledger
//!
//! Holds every bill, keyed by its derived address, together with the token
//! capability that moves funds in and out of custody.
//!
//! ## Atomicity
//!
//! Each operation validates against the current record, then performs at
//! most one external transfer, then commits with an infallible update. If
//! validation or the transfer fails the ledger is unchanged.
//!
//! ## Concurrency
//!
//! Mutating operations take `&mut self`, so one ledger value serializes its
//! callers. Multi-threaded hosts wrap it in
//! [`SharedEscrowLedger`](crate::SharedEscrowLedger).

use std::collections::HashMap;

use serde::Serialize;
use splitbill_core::{derive_bill_address, AccountId, BillAddress, BillName, Identity, Timestamp};
use uuid::Uuid;

use crate::auth::{Authenticated, CallerVerifier};
use crate::bill::Bill;
use crate::config::{ConfigError, LedgerConfig};
use crate::error::EscrowError;
use crate::instruction::{Instruction, SignedInstruction};
use crate::receipt::WithdrawalReceipt;
use crate::transfer::{InMemoryTokenLedger, TokenTransfer};

/// Result of a successfully processed [`SignedInstruction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "record", rename_all = "snake_case")]
pub enum InstructionOutcome {
    /// A bill was created.
    Initialized(Bill),
    /// A contribution was recorded.
    Contributed(Bill),
    /// Settled funds were released.
    Withdrawn(WithdrawalReceipt),
    /// A withdrawn bill was removed.
    Closed(Bill),
}

/// The split-bill escrow ledger.
#[derive(Debug)]
pub struct EscrowLedger<T: TokenTransfer> {
    bills: HashMap<BillAddress, Bill>,
    tokens: T,
    config: LedgerConfig,
    nonces: HashMap<Identity, u64>,
}

impl<T: TokenTransfer> EscrowLedger<T> {
    /// Create an empty ledger with the default configuration.
    pub fn new(tokens: T) -> Self {
        Self {
            bills: HashMap::new(),
            tokens,
            config: LedgerConfig::default(),
            nonces: HashMap::new(),
        }
    }

    /// Create an empty ledger with an explicit configuration.
    pub fn with_config(tokens: T, config: LedgerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(tokens)
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ── Operations ─────────────────────────────────────────────────────

    /// Create a bill owned by the caller.
    ///
    /// Opens the bill's custodial account but moves no funds. Checks run in
    /// order: bill name, duplicate address, target amount, custody account.
    pub fn initialize_split(
        &mut self,
        caller: &Authenticated,
        bill_name: &str,
        total_amount: u64,
        receiver: Identity,
    ) -> Result<Bill, EscrowError> {
        let result = self.try_initialize_split(caller, bill_name, total_amount, receiver);
        log_rejection("initialize_split", &result);
        result
    }

    fn try_initialize_split(
        &mut self,
        caller: &Authenticated,
        bill_name: &str,
        total_amount: u64,
        receiver: Identity,
    ) -> Result<Bill, EscrowError> {
        let creator = caller.identity();
        let name = BillName::new(bill_name)?;
        let address = derive_bill_address(&creator, &name);
        if self.bills.contains_key(&address) {
            return Err(EscrowError::DuplicateBill {
                address: address.to_string(),
            });
        }
        let bill = Bill::open(address, creator, name, receiver, total_amount, Timestamp::now())?;
        self.tokens.open_account(address.custody_account())?;
        self.bills.insert(address, bill.clone());

        tracing::info!(
            bill = %address,
            creator = %creator,
            receiver = %receiver,
            total_amount,
            "bill initialized"
        );
        Ok(bill)
    }

    /// Contribute `amount` from the caller's wallet to the bill
    /// `(creator, bill_name)`.
    ///
    /// Settles the bill when the collected amount reaches the target exactly.
    /// A contribution that would overshoot is rejected.
    pub fn contribute(
        &mut self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
        amount: u64,
    ) -> Result<Bill, EscrowError> {
        let result = self.try_contribute(caller, creator, bill_name, amount);
        log_rejection("contribute", &result);
        result
    }

    fn try_contribute(
        &mut self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
        amount: u64,
    ) -> Result<Bill, EscrowError> {
        let address = resolve_address(creator, bill_name)?;
        let bill = self
            .bills
            .get_mut(&address)
            .ok_or_else(|| EscrowError::BillNotFound {
                address: address.to_string(),
            })?;
        let contributor = caller.identity();
        let plan = bill.plan_contribution(contributor, amount, &self.config)?;

        self.tokens.transfer(
            amount,
            AccountId::Wallet(contributor),
            address.custody_account(),
        )?;

        let settles = plan.settles;
        bill.apply_contribution(plan, Timestamp::now());

        tracing::info!(
            bill = %address,
            contributor = %contributor,
            amount,
            collected = bill.collected_amount(),
            total = bill.total_amount(),
            "contribution recorded"
        );
        if settles {
            tracing::info!(bill = %address, total = bill.total_amount(), "bill settled");
        }
        Ok(bill.clone())
    }

    /// Release the full custodial balance of a settled bill to its receiver.
    ///
    /// Only the bill's authority may withdraw, and only once. Checks run in
    /// order: bill exists, authority, settled, not yet withdrawn.
    pub fn withdraw(
        &mut self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
    ) -> Result<WithdrawalReceipt, EscrowError> {
        let result = self.try_withdraw(caller, creator, bill_name);
        log_rejection("withdraw", &result);
        result
    }

    fn try_withdraw(
        &mut self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
    ) -> Result<WithdrawalReceipt, EscrowError> {
        let address = resolve_address(creator, bill_name)?;
        let bill = self
            .bills
            .get_mut(&address)
            .ok_or_else(|| EscrowError::BillNotFound {
                address: address.to_string(),
            })?;
        let custody = address.custody_account();
        let amount = bill.plan_withdrawal(&caller.identity(), self.tokens.balance(&custody))?;
        let receiver = bill.receiver();

        self.tokens
            .transfer(amount, custody, AccountId::Wallet(receiver))?;

        let now = Timestamp::now();
        bill.mark_withdrawn(now);

        let receipt = WithdrawalReceipt {
            receipt_id: Uuid::new_v4(),
            bill_address: address,
            bill_name: bill.bill_name().clone(),
            authority: bill.authority(),
            receiver,
            amount,
            withdrawn_at: now,
        };
        tracing::info!(
            bill = %address,
            receiver = %receiver,
            amount,
            receipt_id = %receipt.receipt_id,
            "funds withdrawn"
        );
        Ok(receipt)
    }

    /// Remove a withdrawn bill, freeing its derived address.
    ///
    /// Returns the removed record.
    pub fn close(
        &mut self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
    ) -> Result<Bill, EscrowError> {
        let result = self.try_close(caller, creator, bill_name);
        log_rejection("close", &result);
        result
    }

    fn try_close(
        &mut self,
        caller: &Authenticated,
        creator: &Identity,
        bill_name: &str,
    ) -> Result<Bill, EscrowError> {
        let address = resolve_address(creator, bill_name)?;
        let not_found = || EscrowError::BillNotFound {
            address: address.to_string(),
        };
        self.bills
            .get(&address)
            .ok_or_else(not_found)?
            .check_close(&caller.identity())?;
        let removed = self.bills.remove(&address).ok_or_else(not_found)?;

        tracing::info!(bill = %address, "bill closed");
        Ok(removed)
    }

    // ── Signed instructions ────────────────────────────────────────────

    /// Authenticate a signed instruction and run it.
    ///
    /// The signature is verified first, then the signer is matched against
    /// the identity the instruction acts as, then the nonce must exceed the
    /// signer's last accepted nonce. Once those pass the nonce is consumed,
    /// whether or not the operation itself succeeds.
    pub fn process<V: CallerVerifier>(
        &mut self,
        verifier: &V,
        signed: &SignedInstruction,
    ) -> Result<InstructionOutcome, EscrowError> {
        let caller = match verifier.verify(signed) {
            Ok(caller) => caller,
            Err(err) => {
                tracing::debug!(
                    op = signed.instruction.op_name(),
                    signer = %signed.signer,
                    error = %err,
                    "instruction rejected"
                );
                return Err(err);
            }
        };
        let signer = caller.identity();

        if let Some(acting) = signed.instruction.acting_identity() {
            if acting != signer {
                let err = EscrowError::SignerMismatch {
                    expected: acting.to_hex(),
                    signer: signer.to_hex(),
                };
                tracing::debug!(op = signed.instruction.op_name(), error = %err, "instruction rejected");
                return Err(err);
            }
        }
        if let Some(&last) = self.nonces.get(&signer) {
            if signed.nonce <= last {
                let err = EscrowError::StaleNonce {
                    signer: signer.to_hex(),
                    nonce: signed.nonce,
                    last,
                };
                tracing::debug!(op = signed.instruction.op_name(), error = %err, "instruction rejected");
                return Err(err);
            }
        }
        self.nonces.insert(signer, signed.nonce);

        tracing::debug!(
            op = signed.instruction.op_name(),
            signer = %signer,
            nonce = signed.nonce,
            "processing signed instruction"
        );

        match &signed.instruction {
            Instruction::InitializeSplit {
                bill_name,
                total_amount,
                receiver,
                ..
            } => self
                .initialize_split(&caller, bill_name, *total_amount, *receiver)
                .map(InstructionOutcome::Initialized),
            Instruction::Contribute {
                creator,
                bill_name,
                amount,
                ..
            } => self
                .contribute(&caller, creator, bill_name, *amount)
                .map(InstructionOutcome::Contributed),
            Instruction::Withdraw { creator, bill_name } => self
                .withdraw(&caller, creator, bill_name)
                .map(InstructionOutcome::Withdrawn),
            Instruction::Close { creator, bill_name } => self
                .close(&caller, creator, bill_name)
                .map(InstructionOutcome::Closed),
        }
    }

    /// The last nonce accepted from `signer`.
    pub fn last_nonce(&self, signer: &Identity) -> Option<u64> {
        self.nonces.get(signer).copied()
    }

    // ── Queries ────────────────────────────────────────────────────────

    /// The bill `(creator, bill_name)`, if it exists.
    pub fn bill(&self, creator: &Identity, bill_name: &str) -> Option<&Bill> {
        let address = resolve_address(creator, bill_name).ok()?;
        self.bills.get(&address)
    }

    /// The bill stored at `address`, if any.
    pub fn bill_at(&self, address: &BillAddress) -> Option<&Bill> {
        self.bills.get(address)
    }

    /// All live bills, in no particular order.
    pub fn bills(&self) -> impl Iterator<Item = &Bill> {
        self.bills.values()
    }

    /// Number of live bills.
    pub fn len(&self) -> usize {
        self.bills.len()
    }

    /// Whether the ledger holds no bills.
    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    /// Balance of the custodial account of the bill at `address`.
    pub fn custody_balance(&self, address: &BillAddress) -> u64 {
        self.tokens.balance(&address.custody_account())
    }

    /// Read-only view of the token capability.
    ///
    /// There is no mutable accessor: funds leave a custodial account only
    /// through [`withdraw`](Self::withdraw).
    pub fn tokens(&self) -> &T {
        &self.tokens
    }
}

impl EscrowLedger<InMemoryTokenLedger> {
    /// Credit `amount` new tokens to `identity`'s wallet.
    ///
    /// Only wallets can be funded; custodial accounts receive funds through
    /// [`contribute`](Self::contribute) alone.
    pub fn fund_wallet(&mut self, identity: Identity, amount: u64) -> Result<(), EscrowError> {
        self.tokens.mint(identity, amount)?;
        tracing::info!(wallet = %identity, amount, "wallet funded");
        Ok(())
    }
}

fn resolve_address(creator: &Identity, bill_name: &str) -> Result<BillAddress, EscrowError> {
    let name = BillName::new(bill_name)?;
    Ok(derive_bill_address(creator, &name))
}

fn log_rejection<R>(op: &'static str, result: &Result<R, EscrowError>) {
    match result {
        Err(err @ EscrowError::TransferFailed(_)) => {
            tracing::warn!(op, error = %err, "transfer failed, ledger unchanged");
        }
        Err(err) => {
            tracing::debug!(op, error = %err, "operation rejected");
        }
        Ok(_) => {}
    }
}
