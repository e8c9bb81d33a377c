//! Shared utilities for finquery crates

pub mod logging;

pub use logging::init_tracing;
