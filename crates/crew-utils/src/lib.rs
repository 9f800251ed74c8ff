//! Shared utilities for market-crew
//!
//! This crate provides common functionality used across the market-crew
//! workspace, including logging setup and keyring credential loading.

pub mod keyring;
pub mod logging;

pub use keyring::{KeyringError, fetch_key, load_into_env};
pub use logging::init_tracing;
