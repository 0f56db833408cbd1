#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use feeledger::domain::money::Amount;
use feeledger::domain::ports::TransactionStore;
use feeledger::domain::transaction::{
    CategoryTag, PaymentDraft, PaymentMode, ReceiptNumber, Transaction, TransactionStatus,
};
use feeledger::error::{FeeError, Result};
use feeledger::infrastructure::in_memory::InMemoryTransactionStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

pub fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

pub fn paid_tx(id: u64, student: u32, tag: CategoryTag, amount: Decimal) -> Transaction {
    Transaction {
        id,
        student,
        tag,
        amount: Amount::new(amount).unwrap(),
        mode: PaymentMode::Cash,
        status: TransactionStatus::Paid,
        paid_at: timestamp(),
        receipt: ReceiptNumber(format!("RCPT-{id:06}")),
    }
}

/// Store that fails the first `failures` add calls before any write, then
/// behaves like the in-memory store.
pub struct FlakyStore {
    pub inner: InMemoryTransactionStore,
    remaining_failures: AtomicUsize,
}

impl FlakyStore {
    pub fn failing(failures: usize) -> Self {
        Self {
            inner: InMemoryTransactionStore::new(),
            remaining_failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl TransactionStore for FlakyStore {
    async fn add(&self, draft: PaymentDraft) -> Result<Transaction> {
        if self.remaining_failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        })
        .is_ok()
        {
            return Err(FeeError::Persistence("backend unreachable".to_string()));
        }
        self.inner.add(draft).await
    }

    async fn list_for_student(&self, student: u32) -> Result<Vec<Transaction>> {
        self.inner.list_for_student(student).await
    }
}

/// Store that writes first and then reports failure, simulating a network
/// timeout after a successful server-side write.
pub struct LostResponseStore {
    pub inner: InMemoryTransactionStore,
    drop_response: AtomicUsize,
}

impl LostResponseStore {
    pub fn dropping(responses: usize) -> Self {
        Self {
            inner: InMemoryTransactionStore::new(),
            drop_response: AtomicUsize::new(responses),
        }
    }
}

#[async_trait]
impl TransactionStore for LostResponseStore {
    async fn add(&self, draft: PaymentDraft) -> Result<Transaction> {
        let tx = self.inner.add(draft).await?;
        if self.drop_response.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            n.checked_sub(1)
        })
        .is_ok()
        {
            return Err(FeeError::Persistence("timed out waiting for reply".to_string()));
        }
        Ok(tx)
    }

    async fn list_for_student(&self, student: u32) -> Result<Vec<Transaction>> {
        self.inner.list_for_student(student).await
    }
}

/// Store whose `add` blocks until the gate is released, for exercising the
/// in-flight confirm guard.
pub struct GatedStore {
    pub inner: InMemoryTransactionStore,
    pub gate: Arc<Notify>,
}

impl GatedStore {
    pub fn new() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                inner: InMemoryTransactionStore::new(),
                gate: gate.clone(),
            },
            gate,
        )
    }
}

#[async_trait]
impl TransactionStore for GatedStore {
    async fn add(&self, draft: PaymentDraft) -> Result<Transaction> {
        self.gate.notified().await;
        self.inner.add(draft).await
    }

    async fn list_for_student(&self, student: u32) -> Result<Vec<Transaction>> {
        self.inner.list_for_student(student).await
    }
}
