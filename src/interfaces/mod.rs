//! Adapters between the core and the outside world (CSV import/export).

pub mod csv;
