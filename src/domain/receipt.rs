use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display-only receipt identifier shown on the preview screen before a
/// payment is persisted.
///
/// Built deterministically from the draft timestamp (`yyyyMMddHHmmss`) and
/// the student's admission number. It is a distinct type from
/// `ReceiptNumber` so it cannot end up in the transaction log, and its
/// `Display` carries a trailing `*` so the preview cannot pass it off as an
/// authoritative receipt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ProvisionalReceipt(String);

impl ProvisionalReceipt {
    pub fn new(timestamp: NaiveDateTime, admission_no: &str) -> Self {
        Self(format!("{}{}", timestamp.format("%Y%m%d%H%M%S"), admission_no))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProvisionalReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*", self.0)
    }
}
