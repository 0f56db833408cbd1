use crate::application::allocation::AllocationResult;
use crate::error::Result;
use std::io::Write;

/// Writes an allocation breakdown as CSV, one row per category.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_report(&mut self, results: &[AllocationResult]) -> Result<()> {
        for result in results {
            self.writer.serialize(result)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
