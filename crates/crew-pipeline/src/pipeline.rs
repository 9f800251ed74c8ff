//! Pipeline definition and execution
//!
//! A pipeline owns a set of tasks with dependencies between them. Build
//! time validates the graph (unique ids, known dependencies, no cycles)
//! and fixes the execution order; kickoff renders each task's template,
//! threads dependency outputs into prompts, and collects every result.

use crate::error::{PipelineError, Result};
use crate::result::PipelineResult;
use crate::task::Task;
use crew_core::Context;
use crew_llm::{CompletionRequest, LlmProvider, Message};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// How the pipeline coordinates its tasks
#[derive(Clone)]
pub enum Process {
    /// Run tasks in dependency order; the last task's output is final
    Sequential,

    /// Run tasks in dependency order, then have a manager model compose
    /// the final deliverable from all task outputs
    Managed {
        /// Provider backing the manager model
        provider: Arc<dyn LlmProvider>,
        /// Manager model identifier
        model: String,
    },
}

/// A pipeline of dependent tasks executed by role agents
pub struct Pipeline {
    tasks: Vec<Task>,
    /// Indices into `tasks` in a valid execution order
    order: Vec<usize>,
    process: Process,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The tasks in declaration order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task ids in execution order
    pub fn execution_order(&self) -> Vec<&str> {
        self.order.iter().map(|&i| self.tasks[i].id.as_str()).collect()
    }

    /// Run all tasks against the given kickoff inputs
    ///
    /// Inputs are interpolated into task description templates, e.g.
    /// `{"ticker": "AAPL"}` fills `{{ ticker }}` placeholders. The shared
    /// [`Context`] accumulates each task's output; dependent tasks read
    /// their producers' work back out of it, and agents get the same view
    /// while they run.
    pub async fn kickoff(&self, inputs: HashMap<String, String>) -> Result<PipelineResult> {
        let mut context = Context::new();
        let mut last_output = String::new();

        for &index in &self.order {
            let task = &self.tasks[index];
            info!(task = %task.id, agent = %task.agent.name(), "Starting task");

            let description = task.render_description(&inputs)?;
            let dep_outputs: Vec<(String, String)> = task
                .depends_on
                .iter()
                .filter_map(|id| {
                    context
                        .task_output(id)
                        .map(|out| (id.clone(), out.to_string()))
                })
                .collect();

            let prompt = task.prompt(&description, &dep_outputs);
            debug!(task = %task.id, prompt_length = prompt.len(), "Task prompt built");

            let output = task
                .agent
                .process(prompt, &mut context)
                .await
                .map_err(|source| PipelineError::AgentFailed {
                    task: task.id.clone(),
                    source,
                })?;

            info!(task = %task.id, output_length = output.len(), "Task completed");
            context.set_task_output(&task.id, &output);
            last_output = output;
        }

        let outputs: HashMap<String, String> = self
            .tasks
            .iter()
            .filter_map(|task| {
                context
                    .task_output(&task.id)
                    .map(|out| (task.id.clone(), out.to_string()))
            })
            .collect();

        let final_output = match &self.process {
            Process::Sequential => last_output,
            Process::Managed { provider, model } => {
                self.manager_pass(provider.as_ref(), model, &outputs).await?
            }
        };

        Ok(PipelineResult {
            final_output,
            task_outputs: outputs,
        })
    }

    /// Have the manager model compose the final deliverable
    async fn manager_pass(
        &self,
        provider: &dyn LlmProvider,
        model: &str,
        outputs: &HashMap<String, String>,
    ) -> Result<String> {
        let mut briefing = String::from(
            "Your crew has finished its tasks. Review their outputs and \
             produce the final deliverable described by the last task. \
             Keep everything that is correct, fix inconsistencies, and \
             return only the deliverable itself.\n",
        );

        for &index in &self.order {
            let task = &self.tasks[index];
            if let Some(output) = outputs.get(&task.id) {
                briefing.push_str(&format!(
                    "\n--- Task '{}' (expected: {}) ---\n{}\n",
                    task.id, task.expected_output, output
                ));
            }
        }

        info!(model = %model, "Running manager pass");
        let request = CompletionRequest::builder(model)
            .system("You are the crew manager coordinating a team of analysts.")
            .add_message(Message::user(briefing))
            .max_tokens(4096)
            .build();

        let response = provider
            .complete(request)
            .await
            .map_err(|e| PipelineError::ManagerFailed(e.to_string()))?;

        Ok(response.message.text().unwrap_or_default().to_string())
    }
}

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    tasks: Vec<Task>,
    process: Process,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            process: Process::Sequential,
        }
    }

    /// Add a task to the pipeline
    pub fn add_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Set the coordination process
    pub fn process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    /// Validate the task graph and build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if self.tasks.is_empty() {
            return Err(PipelineError::NoTasks);
        }

        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (index, task) in self.tasks.iter().enumerate() {
            if positions.insert(task.id.as_str(), index).is_some() {
                return Err(PipelineError::DuplicateTask(task.id.clone()));
            }
        }

        for task in &self.tasks {
            for dep in &task.depends_on {
                if !positions.contains_key(dep.as_str()) {
                    return Err(PipelineError::UnknownDependency {
                        task: task.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let order = topological_order(&self.tasks, &positions)?;

        Ok(Pipeline {
            tasks: self.tasks,
            order,
            process: self.process,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Topological order over the tasks, preserving declaration order among
/// tasks that are ready at the same time
fn topological_order(tasks: &[Task], positions: &HashMap<&str, usize>) -> Result<Vec<usize>> {
    let mut order = Vec::with_capacity(tasks.len());
    let mut done = vec![false; tasks.len()];

    while order.len() < tasks.len() {
        let mut progressed = false;

        for (index, task) in tasks.iter().enumerate() {
            if done[index] {
                continue;
            }
            let ready = task
                .depends_on
                .iter()
                .all(|dep| positions.get(dep.as_str()).is_some_and(|&i| done[i]));

            if ready {
                done[index] = true;
                order.push(index);
                progressed = true;
            }
        }

        if !progressed {
            let stuck: Vec<&str> = tasks
                .iter()
                .enumerate()
                .filter(|(i, _)| !done[*i])
                .map(|(_, t)| t.id.as_str())
                .collect();
            return Err(PipelineError::CycleDetected(stuck.join(", ")));
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crew_core::Agent;
    use crew_llm::{
        CompletionResponse, LlmError, StopReason, TokenUsage,
    };

    /// Agent that returns a fixed answer, recording the prompt it saw
    struct FixedAgent {
        name: String,
        answer: String,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl FixedAgent {
        fn new(name: &str, answer: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                answer: answer.to_string(),
                seen: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Agent for FixedAgent {
        async fn process(
            &self,
            input: String,
            _context: &mut Context,
        ) -> crew_core::Result<String> {
            self.seen.lock().unwrap().push(input);
            Ok(self.answer.clone())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct ManagerProvider;

    #[async_trait]
    impl LlmProvider for ManagerProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, LlmError> {
            let briefing = request.messages[0].text().unwrap_or_default();
            assert!(briefing.contains("Task 'price_trend'"));
            Ok(CompletionResponse {
                message: Message::assistant("# Final newsletter"),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &'static str {
            "manager"
        }
    }

    fn three_task_pipeline(process: Process) -> Pipeline {
        let trend = FixedAgent::new("trend", "Trend: up");
        let news = FixedAgent::new("news", "Fear index: 30");
        let writer = FixedAgent::new("writer", "# Newsletter");

        Pipeline::builder()
            .add_task(Task::new(
                "price_trend",
                "Analyze {{ ticker }} prices",
                "up, down or sideways",
                trend,
            ))
            .add_task(Task::new(
                "news_digest",
                "Search news for {{ ticker }}",
                "fear/greed summary",
                news,
            ))
            .add_task(
                Task::new("write_newsletter", "Write it up", "3 paragraphs", writer)
                    .depends_on(["price_trend", "news_digest"]),
            )
            .process(process)
            .build()
            .unwrap()
    }

    #[test]
    fn test_execution_order_respects_dependencies() {
        let pipeline = three_task_pipeline(Process::Sequential);
        assert_eq!(
            pipeline.execution_order(),
            vec!["price_trend", "news_digest", "write_newsletter"]
        );
    }

    #[test]
    fn test_cycle_rejected() {
        let a = FixedAgent::new("a", "x");
        let b = FixedAgent::new("b", "y");

        let result = Pipeline::builder()
            .add_task(Task::new("first", "d", "o", a).depends_on(["second"]))
            .add_task(Task::new("second", "d", "o", b).depends_on(["first"]))
            .build();

        assert!(matches!(result, Err(PipelineError::CycleDetected(_))));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let a = FixedAgent::new("a", "x");
        let result = Pipeline::builder()
            .add_task(Task::new("first", "d", "o", a).depends_on(["ghost"]))
            .build();

        assert!(matches!(
            result,
            Err(PipelineError::UnknownDependency { dependency, .. }) if dependency == "ghost"
        ));
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let a = FixedAgent::new("a", "x");
        let b = FixedAgent::new("b", "y");
        let result = Pipeline::builder()
            .add_task(Task::new("same", "d", "o", a))
            .add_task(Task::new("same", "d", "o", b))
            .build();

        assert!(matches!(result, Err(PipelineError::DuplicateTask(_))));
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        assert!(matches!(
            Pipeline::builder().build(),
            Err(PipelineError::NoTasks)
        ));
    }

    #[tokio::test]
    async fn test_sequential_kickoff_collects_all_outputs() {
        let pipeline = three_task_pipeline(Process::Sequential);
        let inputs = HashMap::from([("ticker".to_string(), "AAPL".to_string())]);

        let result = pipeline.kickoff(inputs).await.unwrap();
        assert_eq!(result.final_output, "# Newsletter");
        assert_eq!(result.task_output("price_trend"), Some("Trend: up"));
        assert_eq!(result.task_output("news_digest"), Some("Fear index: 30"));
        assert_eq!(result.task_outputs.len(), 3);
    }

    #[tokio::test]
    async fn test_dependency_outputs_threaded_into_prompt() {
        let trend = FixedAgent::new("trend", "Trend: up");
        let writer = FixedAgent::new("writer", "# Newsletter");

        let pipeline = Pipeline::builder()
            .add_task(Task::new("price_trend", "Analyze {{ ticker }}", "trend", trend))
            .add_task(
                Task::new("write_newsletter", "Write it", "3 paragraphs", writer.clone())
                    .depends_on(["price_trend"]),
            )
            .build()
            .unwrap();

        let inputs = HashMap::from([("ticker".to_string(), "AAPL".to_string())]);
        pipeline.kickoff(inputs).await.unwrap();

        let seen = writer.seen.lock().unwrap();
        assert!(seen[0].contains("Trend: up"));
    }

    /// Agent that answers from the shared context instead of its prompt
    struct BlackboardAgent;

    #[async_trait]
    impl Agent for BlackboardAgent {
        async fn process(
            &self,
            _input: String,
            context: &mut Context,
        ) -> crew_core::Result<String> {
            let trend = context.task_output("price_trend").unwrap_or("missing");
            Ok(format!("saw: {trend}"))
        }

        fn name(&self) -> &str {
            "blackboard"
        }
    }

    #[tokio::test]
    async fn test_task_outputs_readable_through_context() {
        let trend = FixedAgent::new("trend", "Trend: up");
        let pipeline = Pipeline::builder()
            .add_task(Task::new("price_trend", "Analyze", "trend", trend))
            .add_task(
                Task::new("write_newsletter", "Write", "3 paragraphs", Arc::new(BlackboardAgent))
                    .depends_on(["price_trend"]),
            )
            .build()
            .unwrap();

        let result = pipeline.kickoff(HashMap::new()).await.unwrap();
        assert_eq!(result.final_output, "saw: Trend: up");
        assert_eq!(result.task_output("write_newsletter"), Some("saw: Trend: up"));
    }

    #[tokio::test]
    async fn test_managed_process_runs_manager_pass() {
        let pipeline = three_task_pipeline(Process::Managed {
            provider: Arc::new(ManagerProvider),
            model: "gemini-1.0-pro".to_string(),
        });

        let inputs = HashMap::from([("ticker".to_string(), "AAPL".to_string())]);
        let result = pipeline.kickoff(inputs).await.unwrap();

        assert_eq!(result.final_output, "# Final newsletter");
        // Intermediate outputs survive the manager pass
        assert_eq!(result.task_outputs.len(), 3);
    }
}
