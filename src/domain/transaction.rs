use crate::domain::money::Amount;
use crate::domain::receipt::ProvisionalReceipt;
use crate::domain::schedule::CategoryKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a payment was tagged against.
///
/// `Full` covers every category of the schedule at once; `Custom` is an
/// ad-hoc charge outside the schedule; `Legacy` absorbs unrecognized tags
/// from historical data. Neither of the last two participates in
/// per-category allocation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CategoryTag {
    Tuition,
    Materials,
    Full,
    Custom,
    #[serde(other)]
    Legacy,
}

impl CategoryTag {
    /// Whether a payment with this tag counts directly toward the given
    /// schedule category. `Full`, `Custom` and `Legacy` never match; full
    /// coverage is handled separately by the allocation engine.
    pub fn matches(&self, kind: CategoryKind) -> bool {
        matches!(
            (self, kind),
            (CategoryTag::Tuition, CategoryKind::Tuition)
                | (CategoryTag::Materials, CategoryKind::Materials)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Cash,
    Upi,
    Cheque,
    BankTransfer,
}

/// Lifecycle state of a recorded transaction. Only `Paid` transactions are
/// receipts of money; `Pending` and `Overdue` are liabilities and never
/// count toward what a student has paid.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Paid,
    Pending,
    Overdue,
}

/// Store-assigned receipt identifier. Opaque to the core; its format is the
/// store's business.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ReceiptNumber(pub String);

impl fmt::Display for ReceiptNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted payment record. Immutable once written; there is no update
/// or delete path in the core.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: u64,
    pub student: u32,
    #[serde(rename = "category")]
    pub tag: CategoryTag,
    pub amount: Amount,
    pub mode: PaymentMode,
    pub status: TransactionStatus,
    pub paid_at: NaiveDateTime,
    pub receipt: ReceiptNumber,
}

/// An in-memory payment awaiting confirmation. Built by
/// `PaymentWorkflow::preview`, superseded by the authoritative
/// `Transaction` the store returns on confirm; never persisted as-is.
///
/// The idempotency key travels with the draft across retries so a store
/// that deduplicates on it cannot record the same collection twice.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub student: u32,
    pub admission_no: String,
    pub tag: CategoryTag,
    pub amount: Amount,
    pub mode: PaymentMode,
    pub drafted_at: NaiveDateTime,
    pub provisional: ProvisionalReceipt,
    pub idempotency_key: Uuid,
}
