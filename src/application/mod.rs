//! Application layer: the allocation engine that reconciles transactions
//! against a fee schedule, and the preview/confirm workflow for recording
//! a payment.

pub mod allocation;
pub mod workflow;
