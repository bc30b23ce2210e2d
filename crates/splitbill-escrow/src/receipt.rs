//! Withdrawal receipts.

use serde::{Deserialize, Serialize};
use splitbill_core::{
    sha256_digest, BillAddress, BillName, CanonicalBytes, ContentDigest, Identity, Timestamp,
};
use uuid::Uuid;

use crate::error::EscrowError;

/// Record of a settled bill's funds being released to its receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    /// Unique receipt identifier.
    pub receipt_id: Uuid,
    /// The bill the funds were held by.
    pub bill_address: BillAddress,
    /// The bill's label.
    pub bill_name: BillName,
    /// The authority that requested the withdrawal.
    pub authority: Identity,
    /// The identity credited.
    pub receiver: Identity,
    /// The amount released (the full custodial balance).
    pub amount: u64,
    /// When the funds moved.
    pub withdrawn_at: Timestamp,
}

impl WithdrawalReceipt {
    /// SHA-256 over the receipt's canonical JSON.
    pub fn digest(&self) -> Result<ContentDigest, EscrowError> {
        let bytes = CanonicalBytes::new(self)?;
        Ok(sha256_digest(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitbill_core::derive_bill_address;

    fn receipt() -> WithdrawalReceipt {
        let name = BillName::new("trip").unwrap();
        let authority = Identity::from_bytes([1; 32]);
        WithdrawalReceipt {
            receipt_id: Uuid::new_v4(),
            bill_address: derive_bill_address(&authority, &name),
            bill_name: name,
            authority,
            receiver: Identity::from_bytes([2; 32]),
            amount: 1000,
            withdrawn_at: Timestamp::now(),
        }
    }

    #[test]
    fn digest_is_stable_and_content_bound() {
        let r = receipt();
        assert_eq!(r.digest().unwrap(), r.digest().unwrap());
        let mut other = r.clone();
        other.amount = 999;
        assert_ne!(r.digest().unwrap(), other.digest().unwrap());
    }

    #[test]
    fn receipt_json_shape() {
        let r = receipt();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["amount"], 1000);
        assert_eq!(json["bill_name"], "trip");
        assert_eq!(json["bill_address"], r.bill_address.to_hex());
    }
}
