//! # Deterministic Addresses
//!
//! A bill's storage address is a pure function of `(creator, bill name)`.
//! Creation and lookup both go through [`derive_bill_address`], so the
//! address is the index: one bill per `(creator, name)` pair, with no
//! separate lookup table.
//!
//! Token accounts are named by [`AccountId`]. A party's wallet is keyed by
//! its identity. A bill's custodial account is keyed by the bill address, so
//! no party key can ever name it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::Sha256Accumulator;
use crate::encoding::{hex_prefix, hex_to_array, to_hex};
use crate::error::ValidationError;
use crate::identity::{BillName, Identity};

/// Domain tag mixed into every bill address.
pub const BILL_ADDRESS_DOMAIN: &[u8] = b"splitbill:bill:v1";

/// The derived 32-byte address of a bill record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BillAddress([u8; 32]);

impl BillAddress {
    /// Wrap raw address bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        hex_to_array("bill address", hex).map(Self)
    }

    /// The custodial token account controlled by this bill.
    pub fn custody_account(&self) -> AccountId {
        AccountId::Custody(*self)
    }
}

impl std::fmt::Debug for BillAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BillAddress({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for BillAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bill:{}", self.to_hex())
    }
}

impl Serialize for BillAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BillAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Derive the address of the bill `name` created by `creator`.
pub fn derive_bill_address(creator: &Identity, name: &BillName) -> BillAddress {
    let mut acc = Sha256Accumulator::new();
    acc.update_prefixed(BILL_ADDRESS_DOMAIN)
        .update_fixed(creator.as_bytes())
        .update_prefixed(name.as_str().as_bytes());
    BillAddress(acc.finalize())
}

/// A token account known to the transfer capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum AccountId {
    /// A party's own wallet.
    Wallet(Identity),
    /// The custodial account of a bill.
    Custody(BillAddress),
}

impl From<Identity> for AccountId {
    fn from(identity: Identity) -> Self {
        Self::Wallet(identity)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wallet(id) => write!(f, "wallet:{id}"),
            Self::Custody(addr) => write!(f, "custody:{}", addr.to_hex()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> BillName {
        BillName::new(s).unwrap()
    }

    #[test]
    fn derivation_is_deterministic() {
        let creator = Identity::from_bytes([1; 32]);
        assert_eq!(
            derive_bill_address(&creator, &name("dinner")),
            derive_bill_address(&creator, &name("dinner"))
        );
    }

    #[test]
    fn different_names_give_different_addresses() {
        let creator = Identity::from_bytes([1; 32]);
        assert_ne!(
            derive_bill_address(&creator, &name("dinner")),
            derive_bill_address(&creator, &name("lunch"))
        );
    }

    #[test]
    fn different_creators_give_different_addresses() {
        let n = name("dinner");
        assert_ne!(
            derive_bill_address(&Identity::from_bytes([1; 32]), &n),
            derive_bill_address(&Identity::from_bytes([2; 32]), &n)
        );
    }

    #[test]
    fn custody_account_is_not_a_wallet() {
        let addr = derive_bill_address(&Identity::from_bytes([3; 32]), &name("rent"));
        let custody = addr.custody_account();
        assert_eq!(custody, AccountId::Custody(addr));
        // A wallet with the same 32 bytes is still a different account.
        assert_ne!(custody, AccountId::Wallet(Identity::from_bytes(*addr.as_bytes())));
    }

    #[test]
    fn account_id_serde_shape() {
        let id = AccountId::Wallet(Identity::from_bytes([0; 32]));
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json["kind"], "wallet");
        assert_eq!(json["key"], "00".repeat(32));
        let back: AccountId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn bill_address_display_has_prefix() {
        let addr = BillAddress::from_bytes([0xff; 32]);
        assert!(addr.to_string().starts_with("bill:ffff"));
    }
}
