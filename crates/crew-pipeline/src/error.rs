//! Error types for pipeline orchestration

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while building or running a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Pipeline was built without any tasks
    #[error("Pipeline has no tasks")]
    NoTasks,

    /// Two tasks share the same id
    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),

    /// A task depends on an id that is not in the pipeline
    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency {
        /// The task declaring the dependency
        task: String,
        /// The missing dependency id
        dependency: String,
    },

    /// The dependency graph contains a cycle
    #[error("Task dependency cycle involving: {0}")]
    CycleDetected(String),

    /// Rendering a task description failed
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// An agent failed while working on a task
    #[error("Task '{task}' failed: {source}")]
    AgentFailed {
        /// The failing task id
        task: String,
        /// The underlying agent error
        #[source]
        source: crew_core::Error,
    },

    /// The manager pass failed in a managed pipeline
    #[error("Manager pass failed: {0}")]
    ManagerFailed(String),
}
