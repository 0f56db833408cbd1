use super::schedule::{FeeCatalog, FeeSchedule};
use super::transaction::{PaymentDraft, Transaction};
use crate::error::Result;
use async_trait::async_trait;

/// Append-only persistence for payment records.
///
/// The store owns receipt numbering: `add` returns the draft rewritten as
/// an authoritative `Transaction`. Implementations are expected to
/// deduplicate on the draft's idempotency key so a retried `add` after an
/// ambiguous failure returns the originally recorded transaction instead
/// of writing a second one.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn add(&self, draft: PaymentDraft) -> Result<Transaction>;
    async fn list_for_student(&self, student: u32) -> Result<Vec<Transaction>>;
}

/// Source of per-class fee structures. Must answer every class id, falling
/// back to a non-empty default schedule for unknown classes.
pub trait ScheduleCatalog: Send + Sync {
    fn lookup(&self, class_id: &str) -> FeeSchedule;
}

impl ScheduleCatalog for super::schedule::FeeCatalog {
    fn lookup(&self, class_id: &str) -> FeeSchedule {
        FeeCatalog::lookup(self, class_id).clone()
    }
}

pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type ScheduleCatalogBox = Box<dyn ScheduleCatalog>;
