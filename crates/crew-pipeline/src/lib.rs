//! Multi-agent orchestration for market-crew
//!
//! This crate coordinates role agents over a task graph. Tasks declare
//! dependencies on each other; the pipeline validates the graph, runs the
//! tasks in dependency order with rendered descriptions, and collects
//! every task's output alongside the final one.

pub mod error;
pub mod pipeline;
pub mod result;
pub mod task;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineBuilder, Process};
pub use result::PipelineResult;
pub use task::Task;
