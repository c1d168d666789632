#![doc(test(attr(deny(warnings))))]

//! Club Books keeps the double-entry books of small organizations: journal
//! entries, the invoices they create and the payments made against them, and
//! point-in-time reports rebuilt from the journal.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod utils;

pub use crate::core::document::{Document, Tables, Transaction};
pub use crate::core::errors::{BookkeepingError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Club Books tracing initialized.");
    });
}
