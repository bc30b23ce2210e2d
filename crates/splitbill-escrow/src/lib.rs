//! # splitbill-escrow: Split-Bill Escrow Ledger
//!
//! A custodial ledger that collects contributions from independent parties
//! toward a fixed target, settles exactly once when the target is met, and
//! releases the held funds to a designated receiver.
//!
//! ## Lifecycle
//!
//! ```text
//! (none) ──initialize_split──▶ Open ──contribute──▶ Open
//!                               │
//!                               └──contribute (target met)──▶ Settled
//!                                                               │
//!                                             withdraw ◀────────┘
//!                                                │
//!                                                ▼
//!                                             Closed ──close──▶ (removed)
//! ```
//!
//! ## Crate Policy
//!
//! - Bills are stored by [`derive_bill_address`](splitbill_core::derive_bill_address);
//!   the address is the only index.
//! - Funds move only through a [`TokenTransfer`] implementation, and only
//!   `withdraw` debits a custodial account.
//! - Failed operations leave the ledger unchanged.

pub mod auth;
pub mod bill;
pub mod config;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod receipt;
pub mod shared;
pub mod transfer;

pub use auth::{Authenticated, CallerVerifier, Ed25519Verifier};
pub use bill::{Bill, BillStatus, Contribution, ContributionPlan, ContributorLog};
pub use config::{ConfigError, LedgerConfig};
pub use error::EscrowError;
pub use instruction::{Instruction, SignedInstruction};
pub use ledger::{EscrowLedger, InstructionOutcome};
pub use receipt::WithdrawalReceipt;
pub use shared::SharedEscrowLedger;
pub use transfer::{InMemoryTokenLedger, TokenTransfer, TransferError};
