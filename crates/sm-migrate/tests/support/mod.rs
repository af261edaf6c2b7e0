//! Shared test fixtures for sm-migrate integration tests.

#![allow(dead_code)]

pub mod assertions;
pub mod fixture;

use tracing_subscriber::EnvFilter;

/// Route engine logs to the test harness; `RUST_LOG=sm_migrate=trace` shows
/// every rejected loop.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
