//! School-fee ledger core: derives per-category paid/pending breakdowns
//! from a transaction log and records new payments through a preview →
//! confirm workflow with store-assigned receipt numbers.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
