//! # Bill Records
//!
//! A [`Bill`] collects contributions toward a fixed target and releases them
//! to a receiver once the target is met exactly.
//!
//! ## Security Invariant
//!
//! - `collected_amount` always equals the sum of the contributor log and
//!   never exceeds `total_amount`.
//! - The bill is settled if and only if `collected_amount == total_amount`.
//! - Contributor entries are appended and never removed or edited.
//!
//! Every state change is split into a fallible check that returns a plan and
//! an infallible apply. The ledger runs the external transfer between the
//! two, so a failed transfer leaves the record untouched.

use serde::{Deserialize, Serialize};
use splitbill_core::{derive_bill_address, BillAddress, BillName, Identity, Timestamp};

use crate::config::LedgerConfig;
use crate::error::EscrowError;

// ── Bill Status ────────────────────────────────────────────────────────

/// The status of a bill.
///
/// Status machine: `Open → Settled → Closed`
///
/// Terminal state: `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillStatus {
    /// Accepting contributions.
    Open,
    /// Target reached; funds held awaiting withdrawal.
    Settled,
    /// Funds released to the receiver. Terminal state.
    Closed,
}

impl BillStatus {
    /// Whether the target has been reached (`Settled` or `Closed`).
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled | Self::Closed)
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Settled => "SETTLED",
            Self::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Contributor Log ────────────────────────────────────────────────────

/// One accepted contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Who paid.
    pub contributor: Identity,
    /// How much.
    pub amount: u64,
    /// When the contribution was recorded.
    pub recorded_at: Timestamp,
}

/// Append-only, ordered log of contributions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorLog(Vec<Contribution>);

impl ContributorLog {
    /// All entries in the order they were accepted.
    pub fn entries(&self) -> &[Contribution] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no contribution has been accepted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in acceptance order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contribution> {
        self.0.iter()
    }

    /// Whether `identity` has at least one entry.
    pub fn contains(&self, identity: &Identity) -> bool {
        self.0.iter().any(|c| &c.contributor == identity)
    }

    /// Sum of all entry amounts, widened so it cannot overflow.
    pub fn total(&self) -> u128 {
        self.0.iter().map(|c| u128::from(c.amount)).sum()
    }

    /// Total contributed by `identity` across all its entries.
    pub fn total_for(&self, identity: &Identity) -> u128 {
        self.0
            .iter()
            .filter(|c| &c.contributor == identity)
            .map(|c| u128::from(c.amount))
            .sum()
    }

    pub(crate) fn append(&mut self, entry: Contribution) {
        self.0.push(entry);
    }
}

impl<'a> IntoIterator for &'a ContributorLog {
    type Item = &'a Contribution;
    type IntoIter = std::slice::Iter<'a, Contribution>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Bill ───────────────────────────────────────────────────────────────

/// An escrow record tracking a target, its contributions and settlement.
///
/// Deserialization re-checks every record invariant, so a stored record
/// that was edited by hand cannot come back as a live bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BillRecord")]
pub struct Bill {
    address: BillAddress,
    authority: Identity,
    bill_name: BillName,
    receiver: Identity,
    total_amount: u64,
    contributors: ContributorLog,
    collected_amount: u64,
    status: BillStatus,
    created_at: Timestamp,
    settled_at: Option<Timestamp>,
    withdrawn_at: Option<Timestamp>,
}

/// Wire shape of a [`Bill`] before its invariants are checked.
#[derive(Deserialize)]
struct BillRecord {
    address: BillAddress,
    authority: Identity,
    bill_name: BillName,
    receiver: Identity,
    total_amount: u64,
    contributors: ContributorLog,
    collected_amount: u64,
    status: BillStatus,
    created_at: Timestamp,
    settled_at: Option<Timestamp>,
    withdrawn_at: Option<Timestamp>,
}

impl TryFrom<BillRecord> for Bill {
    type Error = EscrowError;

    fn try_from(r: BillRecord) -> Result<Self, Self::Error> {
        let corrupt = |reason: &str| EscrowError::CorruptRecord {
            address: r.address.to_string(),
            reason: reason.to_string(),
        };
        if r.address != derive_bill_address(&r.authority, &r.bill_name) {
            return Err(corrupt("address does not match authority and name"));
        }
        if r.total_amount == 0 {
            return Err(corrupt("total amount is zero"));
        }
        if r.contributors.iter().any(|c| c.amount == 0) {
            return Err(corrupt("contributor log holds a zero amount"));
        }
        if r.contributors.total() != u128::from(r.collected_amount) {
            return Err(corrupt("collected amount differs from the contributor log"));
        }
        if r.collected_amount > r.total_amount {
            return Err(corrupt("collected amount exceeds the target"));
        }
        if r.status.is_settled() != (r.collected_amount == r.total_amount) {
            return Err(corrupt("status disagrees with the collected amount"));
        }
        if r.status.is_settled() != r.settled_at.is_some() {
            return Err(corrupt("settled_at disagrees with the status"));
        }
        if r.status.is_terminal() != r.withdrawn_at.is_some() {
            return Err(corrupt("withdrawn_at disagrees with the status"));
        }
        Ok(Self {
            address: r.address,
            authority: r.authority,
            bill_name: r.bill_name,
            receiver: r.receiver,
            total_amount: r.total_amount,
            contributors: r.contributors,
            collected_amount: r.collected_amount,
            status: r.status,
            created_at: r.created_at,
            settled_at: r.settled_at,
            withdrawn_at: r.withdrawn_at,
        })
    }
}

/// A validated contribution awaiting its transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionPlan {
    /// The contributing identity.
    pub contributor: Identity,
    /// The amount to move into custody.
    pub amount: u64,
    /// The collected amount once the plan is applied.
    pub collected_after: u64,
    /// Whether applying the plan settles the bill.
    pub settles: bool,
}

impl Bill {
    /// Create a new open bill.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidAmount`] if `total_amount` is zero.
    pub fn open(
        address: BillAddress,
        authority: Identity,
        bill_name: BillName,
        receiver: Identity,
        total_amount: u64,
        created_at: Timestamp,
    ) -> Result<Self, EscrowError> {
        if total_amount == 0 {
            return Err(EscrowError::InvalidAmount {
                amount: total_amount,
            });
        }
        Ok(Self {
            address,
            authority,
            bill_name,
            receiver,
            total_amount,
            contributors: ContributorLog::default(),
            collected_amount: 0,
            status: BillStatus::Open,
            created_at,
            settled_at: None,
            withdrawn_at: None,
        })
    }

    /// The derived address of this bill.
    pub fn address(&self) -> BillAddress {
        self.address
    }

    /// The creator, the only identity that may withdraw or close.
    pub fn authority(&self) -> Identity {
        self.authority
    }

    /// The bill's label.
    pub fn bill_name(&self) -> &BillName {
        &self.bill_name
    }

    /// Where settled funds go.
    pub fn receiver(&self) -> Identity {
        self.receiver
    }

    /// The fixed target.
    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    /// The contributor log.
    pub fn contributors(&self) -> &ContributorLog {
        &self.contributors
    }

    /// Sum of accepted contributions.
    pub fn collected_amount(&self) -> u64 {
        self.collected_amount
    }

    /// Amount still needed to reach the target.
    pub fn remaining(&self) -> u64 {
        self.total_amount.saturating_sub(self.collected_amount)
    }

    /// Current status.
    pub fn status(&self) -> BillStatus {
        self.status
    }

    /// Whether the target has been reached.
    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Time the target was reached, if it has been.
    pub fn settled_at(&self) -> Option<Timestamp> {
        self.settled_at
    }

    /// Time the funds were released, if they have been.
    pub fn withdrawn_at(&self) -> Option<Timestamp> {
        self.withdrawn_at
    }

    /// Check a contribution against the bill and the configured limits.
    ///
    /// Checks run in a fixed order: settled, amount, overshoot,
    /// log capacity, repeat contributor.
    pub fn plan_contribution(
        &self,
        contributor: Identity,
        amount: u64,
        config: &LedgerConfig,
    ) -> Result<ContributionPlan, EscrowError> {
        if self.status.is_settled() {
            return Err(EscrowError::BillAlreadySettled {
                address: self.address.to_string(),
                status: self.status.to_string(),
            });
        }
        if amount == 0 {
            return Err(EscrowError::InvalidAmount { amount });
        }
        if amount > self.remaining() {
            return Err(EscrowError::ExcessContribution {
                address: self.address.to_string(),
                amount,
                collected: self.collected_amount,
                total: self.total_amount,
            });
        }
        let collected_after = self.collected_amount + amount;
        if self.contributors.len() >= config.max_contributors {
            return Err(EscrowError::ContributorLimitReached {
                address: self.address.to_string(),
                limit: config.max_contributors,
            });
        }
        if !config.allow_repeat_contributors && self.contributors.contains(&contributor) {
            return Err(EscrowError::DuplicateContributor {
                address: self.address.to_string(),
                contributor: contributor.to_hex(),
            });
        }
        Ok(ContributionPlan {
            contributor,
            amount,
            collected_after,
            settles: collected_after == self.total_amount,
        })
    }

    pub(crate) fn apply_contribution(&mut self, plan: ContributionPlan, at: Timestamp) {
        self.contributors.append(Contribution {
            contributor: plan.contributor,
            amount: plan.amount,
            recorded_at: at,
        });
        self.collected_amount = plan.collected_after;
        if plan.settles {
            self.status = BillStatus::Settled;
            self.settled_at = Some(at);
        }
    }

    /// Check that `caller` may withdraw now, returning the amount to release.
    ///
    /// Checks run in a fixed order: authority, settled, not yet withdrawn.
    pub fn plan_withdrawal(
        &self,
        caller: &Identity,
        custody_balance: u64,
    ) -> Result<u64, EscrowError> {
        self.ensure_authority(caller)?;
        if !self.status.is_settled() {
            return Err(EscrowError::NotSettled {
                address: self.address.to_string(),
                status: self.status.to_string(),
            });
        }
        if self.status == BillStatus::Closed || custody_balance == 0 {
            return Err(EscrowError::AlreadyWithdrawn {
                address: self.address.to_string(),
            });
        }
        Ok(custody_balance)
    }

    pub(crate) fn mark_withdrawn(&mut self, at: Timestamp) {
        self.status = BillStatus::Closed;
        self.withdrawn_at = Some(at);
    }

    /// Check that `caller` may remove this record.
    pub fn check_close(&self, caller: &Identity) -> Result<(), EscrowError> {
        self.ensure_authority(caller)?;
        if !self.status.is_terminal() {
            return Err(EscrowError::BillStillActive {
                address: self.address.to_string(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_authority(&self, caller: &Identity) -> Result<(), EscrowError> {
        if caller != &self.authority {
            return Err(EscrowError::Unauthorized {
                address: self.address.to_string(),
                caller: caller.to_hex(),
            });
        }
        Ok(())
    }
}
