//! Pipeline run results

use std::collections::HashMap;

/// Outcome of a pipeline run
///
/// Retains every task's output next to the final one so callers can
/// inspect intermediate work.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The output of the final task (or the manager pass)
    pub final_output: String,

    /// Output of every task, keyed by task id
    pub task_outputs: HashMap<String, String>,
}

impl PipelineResult {
    /// Output of a specific task, if it ran
    pub fn task_output(&self, id: &str) -> Option<&str> {
        self.task_outputs.get(id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_output_lookup() {
        let result = PipelineResult {
            final_output: "newsletter".to_string(),
            task_outputs: HashMap::from([("price_trend".to_string(), "up".to_string())]),
        };

        assert_eq!(result.task_output("price_trend"), Some("up"));
        assert_eq!(result.task_output("missing"), None);
    }
}
