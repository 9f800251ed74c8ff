//! Core abstractions for the market-crew pipeline
//!
//! This crate defines the fundamental traits and types shared by the rest of
//! the workspace: the [`Agent`] trait, the [`Context`] passed between
//! pipeline stages, and the core [`Error`] type.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
