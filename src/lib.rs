#![doc(test(attr(deny(warnings))))]

//! Basket Budget tracks a shopping budget against a running list of purchases,
//! warns before the list goes over budget, and turns the finished list into a
//! receipt. The ledger and receipt layers are pure; storage, export and the
//! interactive shell sit on top of them.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod receipt;
pub mod storage;
pub mod utils;

pub use errors::{BudgetError, Result};

/// Initializes global tracing and emits a startup info log. Safe to call repeatedly.
pub fn init() {
    utils::init_tracing();
}
