mod common;

use common::paid_tx;
use feeledger::application::allocation::{AllocationStatus, allocate};
use feeledger::domain::money::Balance;
use feeledger::domain::schedule::{CategoryKind, FeeCategory, FeeSchedule};
use feeledger::domain::transaction::{CategoryTag, Transaction, TransactionStatus};
use feeledger::interfaces::csv::transaction_reader::TransactionReader;
use rust_decimal_macros::dec;

fn schedule() -> FeeSchedule {
    FeeSchedule::new(vec![
        FeeCategory::new(CategoryKind::Tuition, Balance::new(dec!(20000))).unwrap(),
        FeeCategory::new(CategoryKind::Materials, Balance::new(dec!(6500))).unwrap(),
    ])
    .unwrap()
}

#[test]
fn test_replay_from_csv_export() {
    // Mixed history: a partial tuition payment, a legacy-tagged payment
    // and a pending installment that must not count.
    let data = "id, student, category, amount, mode, status, paid_at, receipt\n\
                1, 42, tuition, 12000, upi, paid, 2026-01-15T10:30:00, RCPT-000001\n\
                2, 42, annual-day, 250, cash, paid, 2019-03-10T12:00:00, RCPT-000002\n\
                3, 42, materials, 6500, cheque, pending, 2026-02-01T09:00:00, RCPT-000003";
    let transactions: Vec<Transaction> = TransactionReader::new(data.as_bytes())
        .transactions()
        .collect::<Result<_, _>>()
        .unwrap();

    let results = allocate(&schedule(), &transactions);

    let tuition = results
        .iter()
        .find(|r| r.category == CategoryKind::Tuition)
        .unwrap();
    assert_eq!(tuition.paid, Balance::new(dec!(12000)));
    assert_eq!(tuition.pending, Balance::new(dec!(8000)));
    assert_eq!(tuition.status, AllocationStatus::Partial);

    let materials = results
        .iter()
        .find(|r| r.category == CategoryKind::Materials)
        .unwrap();
    assert_eq!(materials.paid, Balance::ZERO);
    assert_eq!(materials.status, AllocationStatus::Pending);
}

#[test]
fn test_full_fee_covers_whole_schedule() {
    let txs = [paid_tx(1, 42, CategoryTag::Full, dec!(26500))];
    let results = allocate(&schedule(), &txs);

    assert!(results.iter().all(|r| r.status == AllocationStatus::Paid));
    assert_eq!(results[0].paid + results[1].paid, Balance::new(dec!(26500)));
}

#[test]
fn test_capping_holds_under_heavy_overpayment() {
    let txs: Vec<Transaction> = (1..=10)
        .map(|id| paid_tx(id, 42, CategoryTag::Tuition, dec!(9000)))
        .collect();
    let results = allocate(&schedule(), &txs);

    for r in &results {
        assert!(r.paid <= r.due);
        assert!(r.pending >= Balance::ZERO);
    }
}

#[test]
fn test_status_consistency_over_mixed_history() {
    let mut txs = vec![
        paid_tx(1, 42, CategoryTag::Tuition, dec!(20000)),
        paid_tx(2, 42, CategoryTag::Materials, dec!(100)),
        paid_tx(3, 42, CategoryTag::Custom, dec!(750)),
    ];
    txs.push({
        let mut t = paid_tx(4, 42, CategoryTag::Materials, dec!(6400));
        t.status = TransactionStatus::Overdue;
        t
    });

    for r in allocate(&schedule(), &txs) {
        match r.status {
            AllocationStatus::Paid => assert!(r.pending.is_zero()),
            AllocationStatus::Pending => assert!(r.paid.is_zero()),
            AllocationStatus::Partial => assert!(!r.paid.is_zero() && !r.pending.is_zero()),
        }
        assert_eq!(r.pending, r.due - r.paid);
    }
}

#[test]
fn test_determinism_across_calls() {
    let txs = [
        paid_tx(1, 42, CategoryTag::Tuition, dec!(500)),
        paid_tx(2, 42, CategoryTag::Full, dec!(100)),
        paid_tx(3, 42, CategoryTag::Legacy, dec!(9999)),
    ];
    let s = schedule();
    let runs: Vec<_> = (0..5).map(|_| allocate(&s, &txs)).collect();
    assert!(runs.windows(2).all(|w| w[0] == w[1]));
}
