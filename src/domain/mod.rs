//! Domain types for the fee ledger: money value objects, fee schedules,
//! payment records and the ports the application layer talks through.

pub mod money;
pub mod ports;
pub mod receipt;
pub mod schedule;
pub mod transaction;
