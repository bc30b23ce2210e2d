//! # End-to-End Bill Lifecycle
//!
//! Drives bills through initialize, contribute, withdraw and close across
//! the core, crypto and escrow crates, checking token balances at each step.

mod common;

use common::{init_tracing, ledger_with, wallet_balance, Party};
use splitbill_core::derive_bill_address;
use splitbill_core::BillName;
use splitbill_escrow::{BillStatus, EscrowError};

#[test]
fn scenario_a_two_halves_settle_and_release() {
    init_tracing();
    let creator = Party::new(1);
    let receiver = Party::new(2);
    let c1 = Party::new(3);
    let c2 = Party::new(4);
    let mut ledger = ledger_with(&[&c1, &c2], 1000);

    let bill = ledger
        .initialize_split(&creator.caller(), "test", 1000, receiver.id())
        .unwrap();
    let address = bill.address();
    assert_eq!(
        address,
        derive_bill_address(&creator.id(), &BillName::new("test").unwrap())
    );

    ledger
        .contribute(&c1.caller(), &creator.id(), "test", 500)
        .unwrap();
    let snapshot = ledger.bill(&creator.id(), "test").unwrap();
    assert_eq!(snapshot.contributors().len(), 1);
    assert!(!snapshot.is_settled());

    ledger
        .contribute(&c2.caller(), &creator.id(), "test", 500)
        .unwrap();
    let snapshot = ledger.bill(&creator.id(), "test").unwrap();
    assert!(snapshot.is_settled());
    assert_eq!(snapshot.status(), BillStatus::Settled);

    let receiver_before = wallet_balance(&ledger, &receiver);
    let receipt = ledger
        .withdraw(&creator.caller(), &creator.id(), "test")
        .unwrap();
    assert_eq!(receipt.amount, 1000);
    assert_eq!(wallet_balance(&ledger, &receiver), receiver_before + 1000);
    assert_eq!(ledger.custody_balance(&address), 0);
    assert_eq!(wallet_balance(&ledger, &c1), 500);
    assert_eq!(wallet_balance(&ledger, &c2), 500);
    assert_eq!(ledger.tokens().total_supply(), 2000);
}

#[test]
fn scenario_b_contribution_after_settlement_is_rejected() {
    init_tracing();
    let creator = Party::new(1);
    let receiver = Party::new(2);
    let c1 = Party::new(3);
    let c2 = Party::new(4);
    let mut ledger = ledger_with(&[&c1, &c2], 1000);

    let address = ledger
        .initialize_split(&creator.caller(), "test", 1000, receiver.id())
        .unwrap()
        .address();
    ledger
        .contribute(&c1.caller(), &creator.id(), "test", 500)
        .unwrap();
    ledger
        .contribute(&c2.caller(), &creator.id(), "test", 500)
        .unwrap();
    let before = ledger.bill_at(&address).cloned().unwrap();

    let err = ledger
        .contribute(&c1.caller(), &creator.id(), "test", 100)
        .unwrap_err();
    assert!(matches!(err, EscrowError::BillAlreadySettled { .. }));
    assert_eq!(ledger.bill_at(&address), Some(&before));
    assert_eq!(ledger.custody_balance(&address), 1000);
    assert_eq!(wallet_balance(&ledger, &c1), 500);
}

#[test]
fn scenario_c_zero_target_creates_nothing() {
    init_tracing();
    let creator = Party::new(1);
    let receiver = Party::new(2);
    let mut ledger = ledger_with(&[], 0);

    let err = ledger
        .initialize_split(&creator.caller(), "test", 0, receiver.id())
        .unwrap_err();
    assert!(matches!(err, EscrowError::InvalidAmount { amount: 0 }));
    assert!(ledger.bill(&creator.id(), "test").is_none());
    assert!(ledger.is_empty());
}

#[test]
fn overshoot_leaves_log_and_custody_untouched() {
    init_tracing();
    let creator = Party::new(1);
    let c1 = Party::new(3);
    let c2 = Party::new(4);
    let mut ledger = ledger_with(&[&c1, &c2], 1000);
    let address = ledger
        .initialize_split(&creator.caller(), "dinner", 1000, creator.id())
        .unwrap()
        .address();

    ledger
        .contribute(&c1.caller(), &creator.id(), "dinner", 700)
        .unwrap();
    let err = ledger
        .contribute(&c2.caller(), &creator.id(), "dinner", 301)
        .unwrap_err();
    assert!(matches!(
        err,
        EscrowError::ExcessContribution {
            amount: 301,
            collected: 700,
            total: 1000,
            ..
        }
    ));
    let bill = ledger.bill_at(&address).unwrap();
    assert_eq!(bill.contributors().len(), 1);
    assert_eq!(ledger.custody_balance(&address), 700);
    assert_eq!(wallet_balance(&ledger, &c2), 1000);

    // The exact remainder still settles.
    let bill = ledger
        .contribute(&c2.caller(), &creator.id(), "dinner", 300)
        .unwrap();
    assert!(bill.is_settled());
}

#[test]
fn only_authority_withdraws_even_after_settlement() {
    init_tracing();
    let creator = Party::new(1);
    let receiver = Party::new(2);
    let c1 = Party::new(3);
    let mut ledger = ledger_with(&[&c1], 1000);
    ledger
        .initialize_split(&creator.caller(), "rent", 1000, receiver.id())
        .unwrap();

    assert!(matches!(
        ledger.withdraw(&creator.caller(), &creator.id(), "rent"),
        Err(EscrowError::NotSettled { .. })
    ));
    ledger
        .contribute(&c1.caller(), &creator.id(), "rent", 1000)
        .unwrap();

    for intruder in [&receiver, &c1] {
        assert!(matches!(
            ledger.withdraw(&intruder.caller(), &creator.id(), "rent"),
            Err(EscrowError::Unauthorized { .. })
        ));
    }
    assert_eq!(wallet_balance(&ledger, &receiver), 0);

    ledger
        .withdraw(&creator.caller(), &creator.id(), "rent")
        .unwrap();
    assert!(matches!(
        ledger.withdraw(&creator.caller(), &creator.id(), "rent"),
        Err(EscrowError::AlreadyWithdrawn { .. })
    ));
    assert_eq!(wallet_balance(&ledger, &receiver), 1000);
}

#[test]
fn close_frees_the_address_for_reuse() {
    init_tracing();
    let creator = Party::new(1);
    let receiver = Party::new(2);
    let c1 = Party::new(3);
    let mut ledger = ledger_with(&[&c1], 1000);

    ledger
        .initialize_split(&creator.caller(), "weekly", 400, receiver.id())
        .unwrap();
    ledger
        .contribute(&c1.caller(), &creator.id(), "weekly", 400)
        .unwrap();
    ledger
        .withdraw(&creator.caller(), &creator.id(), "weekly")
        .unwrap();
    let closed = ledger
        .close(&creator.caller(), &creator.id(), "weekly")
        .unwrap();
    assert_eq!(closed.status(), BillStatus::Closed);
    assert!(closed.withdrawn_at().is_some());
    assert!(ledger.bill(&creator.id(), "weekly").is_none());

    // Second round under the same name.
    ledger
        .initialize_split(&creator.caller(), "weekly", 600, receiver.id())
        .unwrap();
    ledger
        .contribute(&c1.caller(), &creator.id(), "weekly", 600)
        .unwrap();
    let receipt = ledger
        .withdraw(&creator.caller(), &creator.id(), "weekly")
        .unwrap();
    assert_eq!(receipt.amount, 600);
    assert_eq!(wallet_balance(&ledger, &receiver), 1000);
    assert_eq!(wallet_balance(&ledger, &c1), 0);
}

#[test]
fn many_small_contributions_settle_on_the_last() {
    init_tracing();
    let creator = Party::new(1);
    let parties: Vec<Party> = (10..20).map(Party::new).collect();
    let refs: Vec<&Party> = parties.iter().collect();
    let mut ledger = ledger_with(&refs, 100);
    ledger
        .initialize_split(&creator.caller(), "party", 1000, creator.id())
        .unwrap();

    for (i, party) in parties.iter().enumerate() {
        let bill = ledger
            .contribute(&party.caller(), &creator.id(), "party", 100)
            .unwrap();
        assert_eq!(bill.is_settled(), i == parties.len() - 1);
    }
    let bill = ledger.bill(&creator.id(), "party").unwrap();
    let order: Vec<_> = bill.contributors().iter().map(|c| c.contributor).collect();
    let expected: Vec<_> = parties.iter().map(Party::id).collect();
    assert_eq!(order, expected);
}
