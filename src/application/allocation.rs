use crate::domain::money::Balance;
use crate::domain::schedule::{CategoryKind, FeeSchedule};
use crate::domain::transaction::{CategoryTag, Transaction, TransactionStatus};
use serde::Serialize;

/// Payment progress of a single category.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    Paid,
    Partial,
    Pending,
}

/// Per-category breakdown derived from the transaction log.
///
/// Always recomputed from the full log on request, never stored; there is
/// no running balance that could drift from the underlying transactions.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct AllocationResult {
    pub category: CategoryKind,
    pub due: Balance,
    pub paid: Balance,
    pub pending: Balance,
    pub status: AllocationStatus,
}

/// Reconciles a student's transactions against a class schedule.
///
/// Pure and synchronous: the caller supplies the full transaction list in
/// memory, and identical inputs always produce identical output. Rules per
/// category:
///
/// - only `Paid` transactions count; `Pending`/`Overdue` are liabilities,
///   not receipts;
/// - category-tagged amounts are summed, then clipped to the due amount so
///   an overpayment never shows as negative pending;
/// - any full-fee transaction marks the category covered in full, whatever
///   its amount; several full-fee transactions are no different from one.
///   Proration of a short full-fee payment is deliberately not applied;
/// - `Custom` and `Legacy` tags belong to no category and are skipped.
pub fn allocate(schedule: &FeeSchedule, transactions: &[Transaction]) -> Vec<AllocationResult> {
    let paid_txs: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.status == TransactionStatus::Paid)
        .collect();
    let has_full = paid_txs.iter().any(|tx| tx.tag == CategoryTag::Full);

    schedule
        .categories()
        .iter()
        .map(|category| {
            let due = category.due;
            let raw = paid_txs
                .iter()
                .filter(|tx| tx.tag.matches(category.kind))
                .fold(Balance::ZERO, |acc, tx| acc + tx.amount.into());

            let paid = if has_full { due } else { raw.min(due) };
            let pending = due - paid;
            let status = if pending.is_zero() {
                AllocationStatus::Paid
            } else if paid.is_zero() {
                AllocationStatus::Pending
            } else {
                AllocationStatus::Partial
            };

            AllocationResult {
                category: category.kind,
                due,
                paid,
                pending,
                status,
            }
        })
        .collect()
}
