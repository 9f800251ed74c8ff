//! Task definition and prompt rendering

use crate::Result;
use crew_core::Agent;
use minijinja::Environment;
use std::collections::HashMap;
use std::sync::Arc;

/// A unit of work assigned to one agent
///
/// The description is a Jinja template; kickoff inputs such as the ticker
/// are interpolated with `{{ ticker }}` placeholders at run time.
#[derive(Clone)]
pub struct Task {
    /// Unique id within the pipeline
    pub id: String,

    /// What the agent should do (Jinja template)
    pub description: String,

    /// What a good answer looks like
    pub expected_output: String,

    /// The agent responsible for this task
    pub agent: Arc<dyn Agent>,

    /// Ids of tasks whose outputs this task needs
    pub depends_on: Vec<String>,
}

impl Task {
    /// Create a task with no dependencies
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<dyn Agent>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            depends_on: Vec::new(),
        }
    }

    /// Declare dependencies on earlier tasks
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Render the description template against the kickoff inputs
    pub fn render_description(&self, inputs: &HashMap<String, String>) -> Result<String> {
        let mut env = Environment::new();
        env.add_template("task", &self.description)?;
        let template = env.get_template("task")?;
        Ok(template.render(inputs)?)
    }

    /// Compose the full prompt handed to the agent
    ///
    /// Dependency outputs are appended as context sections so the agent
    /// can build on earlier work.
    pub fn prompt(&self, rendered_description: &str, dep_outputs: &[(String, String)]) -> String {
        let mut prompt = String::from(rendered_description);

        prompt.push_str("\n\nExpected output: ");
        prompt.push_str(&self.expected_output);

        for (id, output) in dep_outputs {
            prompt.push_str(&format!("\n\n--- Output of task '{id}' ---\n{output}"));
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crew_core::Context;

    struct StubAgent;

    #[async_trait]
    impl Agent for StubAgent {
        async fn process(
            &self,
            _input: String,
            _context: &mut Context,
        ) -> crew_core::Result<String> {
            Ok("stub".to_string())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn test_render_interpolates_ticker() {
        let task = Task::new(
            "price_trend",
            "Analyze the stock {{ ticker }} price history",
            "up, down or sideways",
            Arc::new(StubAgent),
        );

        let inputs = HashMap::from([("ticker".to_string(), "AAPL".to_string())]);
        let rendered = task.render_description(&inputs).unwrap();
        assert_eq!(rendered, "Analyze the stock AAPL price history");
    }

    #[test]
    fn test_prompt_includes_dependency_outputs() {
        let task = Task::new("write", "Write the newsletter", "3 paragraphs", Arc::new(StubAgent))
            .depends_on(["price_trend", "news_digest"]);

        let prompt = task.prompt(
            "Write the newsletter",
            &[
                ("price_trend".to_string(), "Trend: up".to_string()),
                ("news_digest".to_string(), "Fear index: 20".to_string()),
            ],
        );

        assert!(prompt.contains("Expected output: 3 paragraphs"));
        assert!(prompt.contains("task 'price_trend'"));
        assert!(prompt.contains("Fear index: 20"));
    }

    #[test]
    fn test_depends_on() {
        let task = Task::new("write", "desc", "out", Arc::new(StubAgent))
            .depends_on(["price_trend", "news_digest"]);
        assert_eq!(task.depends_on, vec!["price_trend", "news_digest"]);
    }
}
