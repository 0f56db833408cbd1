use crate::domain::ports::TransactionStore;
use crate::domain::transaction::{PaymentDraft, ReceiptNumber, Transaction, TransactionStatus};
use crate::error::{FeeError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for persisted transactions, keyed by big-endian id.
pub const CF_TRANSACTIONS: &str = "transactions";
/// Column Family mapping idempotency keys to transaction ids.
pub const CF_IDEMPOTENCY: &str = "idempotency";
/// Column Family for store bookkeeping (id counter).
pub const CF_META: &str = "meta";

const NEXT_ID_KEY: &[u8] = b"next_id";

/// A persistent transaction store backed by RocksDB.
///
/// Values are JSON; the id counter lives in a meta column family so
/// receipt numbering survives restarts. `Clone` shares the underlying
/// `Arc<DB>`. Writes are serialized through a mutex so two concurrent
/// `add` calls cannot hand out the same id.
#[derive(Clone)]
pub struct RocksDbTransactionStore {
    db: Arc<DB>,
    write_guard: Arc<Mutex<()>>,
}

impl RocksDbTransactionStore {
    /// Opens or creates a RocksDB instance at the given path with the
    /// required column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default()),
            ColumnFamilyDescriptor::new(CF_IDEMPOTENCY, Options::default()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cfs)
            .map_err(|e| FeeError::Persistence(format!("failed to open store: {e}")))?;

        Ok(Self {
            db: Arc::new(db),
            write_guard: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| FeeError::Persistence(format!("column family {name} not found")))
    }

    fn next_id(&self) -> Result<u64> {
        let cf = self.cf(CF_META)?;
        let current = self
            .db
            .get_cf(cf, NEXT_ID_KEY)
            .map_err(|e| FeeError::Persistence(e.to_string()))?
            .and_then(|bytes| bytes.try_into().ok().map(u64::from_be_bytes))
            .unwrap_or(0);
        let next = current + 1;
        self.db
            .put_cf(cf, NEXT_ID_KEY, next.to_be_bytes())
            .map_err(|e| FeeError::Persistence(e.to_string()))?;
        Ok(next)
    }

    fn get_by_id(&self, id: u64) -> Result<Option<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let bytes = self
            .db
            .get_cf(cf, id.to_be_bytes())
            .map_err(|e| FeeError::Persistence(e.to_string()))?;
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TransactionStore for RocksDbTransactionStore {
    async fn add(&self, draft: PaymentDraft) -> Result<Transaction> {
        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| FeeError::Persistence("store write guard poisoned".to_string()))?;

        // Idempotent retry: a draft we have already recorded comes back as
        // the original transaction.
        let idem_cf = self.cf(CF_IDEMPOTENCY)?;
        let key = draft.idempotency_key.as_bytes();
        if let Some(id_bytes) = self
            .db
            .get_cf(idem_cf, key)
            .map_err(|e| FeeError::Persistence(e.to_string()))?
            && let Ok(id_bytes) = <[u8; 8]>::try_from(id_bytes.as_slice())
            && let Some(existing) = self.get_by_id(u64::from_be_bytes(id_bytes))?
        {
            return Ok(existing);
        }

        let id = self.next_id()?;
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

        // The record and its idempotency mapping land atomically; a crash
        // cannot leave a transaction behind that a retry would not find.
        let tx_cf = self.cf(CF_TRANSACTIONS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(tx_cf, id.to_be_bytes(), serde_json::to_vec(&tx)?);
        batch.put_cf(idem_cf, key, id.to_be_bytes());
        self.db
            .write(batch)
            .map_err(|e| FeeError::Persistence(e.to_string()))?;
        Ok(tx)
    }

    async fn list_for_student(&self, student: u32) -> Result<Vec<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let mut txs = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| FeeError::Persistence(e.to_string()))?;
            let tx: Transaction = serde_json::from_slice(&value)?;
            if tx.student == student {
                txs.push(tx);
            }
        }
        Ok(txs)
    }
}
