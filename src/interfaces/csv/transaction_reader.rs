use crate::domain::transaction::Transaction;
use crate::error::{FeeError, Result};
use std::io::Read;

/// Reads persisted transactions from a CSV export.
///
/// Wraps `csv::Reader` and yields `Result<Transaction>` lazily, so a large
/// export can be replayed without loading it all at once. Whitespace is
/// trimmed and short records are tolerated.
pub struct TransactionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TransactionReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn transactions(self) -> impl Iterator<Item = Result<Transaction>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(FeeError::from))
    }
}
