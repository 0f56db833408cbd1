use crate::domain::ports::TransactionStore;
use crate::domain::transaction::{PaymentDraft, ReceiptNumber, Transaction, TransactionStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    transactions: HashMap<u64, Transaction>,
    by_idempotency_key: HashMap<Uuid, u64>,
    next_id: u64,
}

/// Thread-safe in-memory transaction store.
///
/// Assigns sequential ids and authoritative `RCPT-` receipt numbers, and
/// deduplicates `add` on the draft's idempotency key: a retried draft gets
/// the originally recorded transaction back. `Clone` shares the underlying
/// state, which makes it easy to inspect from tests.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads already-persisted transactions, e.g. replayed from a CSV
    /// export. Ids and receipt numbers are kept as given; the id counter
    /// advances past them so newly added payments do not collide.
    pub async fn load(&self, transactions: Vec<Transaction>) {
        let mut inner = self.inner.write().await;
        for tx in transactions {
            inner.next_id = inner.next_id.max(tx.id);
            inner.transactions.insert(tx.id, tx);
        }
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn add(&self, draft: PaymentDraft) -> crate::error::Result<Transaction> {
        let mut inner = self.inner.write().await;

        if let Some(id) = inner.by_idempotency_key.get(&draft.idempotency_key)
            && let Some(existing) = inner.transactions.get(id)
        {
            return Ok(existing.clone());
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let tx = Transaction {
            id,
            student: draft.student,
            tag: draft.tag,
            amount: draft.amount,
            mode: draft.mode,
            status: TransactionStatus::Paid,
            paid_at: draft.drafted_at,
            receipt: ReceiptNumber(format!("RCPT-{id:06}")),
        };
        inner.transactions.insert(id, tx.clone());
        inner.by_idempotency_key.insert(draft.idempotency_key, id);
        Ok(tx)
    }

    async fn list_for_student(&self, student: u32) -> crate::error::Result<Vec<Transaction>> {
        let inner = self.inner.read().await;
        let mut txs: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|tx| tx.student == student)
            .cloned()
            .collect();
        txs.sort_by_key(|tx| tx.id);
        Ok(txs)
    }
}
