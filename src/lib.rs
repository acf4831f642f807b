#![doc(test(attr(deny(warnings))))]

//! Conscience Core tracks purchases and spending urges, asks an analysis
//! gateway whether each one was necessary, and keeps calling the user about
//! the unnecessary ones until they are returned or the calls give up.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod ledger;
pub mod lifecycle;
pub mod scheduler;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use crate::core::controller::{AppController, NagCycleOutcome};
pub use crate::errors::{ConscienceError, Result};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Conscience Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
