//! Tool management and execution framework for market-crew
//!
//! This crate provides a framework for defining and executing tools (functions)
//! that agents can use to perform actions, plus a registry that hands tool
//! definitions to the LLM layer.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
