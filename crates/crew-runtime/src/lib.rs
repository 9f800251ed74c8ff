//! Agent runtime for market-crew
//!
//! This crate provides the infrastructure for executing role agents:
//! the RoleExecutor for LLM tool loops, a shared step budget for
//! coordinated crews, and the RoleAgent persona wrapper.

pub mod budget;
pub mod executor;
pub mod role;

// Re-export key types
pub use budget::StepBudget;
pub use executor::{ExecutorConfig, RoleExecutor, RoleExecutorBuilder};
pub use role::{Persona, RoleAgent};
