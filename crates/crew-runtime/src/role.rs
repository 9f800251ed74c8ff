//! Role agents with personas
//!
//! A RoleAgent wraps a [`RoleExecutor`] behind the [`Agent`] trait and
//! gives it a persona. The persona's role, goal and backstory become the
//! system prompt for every completion the executor makes.

use crate::budget::StepBudget;
use crate::executor::{ExecutorConfig, RoleExecutor, RoleExecutorBuilder};
use async_trait::async_trait;
use crew_core::{Agent, Context, Result};
use crew_llm::LlmProvider;
use crew_tools::ToolRegistry;
use std::sync::Arc;

/// Persona for a role agent
#[derive(Debug, Clone)]
pub struct Persona {
    /// Short role title, e.g. "Senior stock price analyst"
    pub role: String,

    /// What this role is trying to achieve
    pub goal: String,

    /// Background framing that shapes the role's voice
    pub backstory: String,
}

impl Persona {
    /// Create a new persona
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Render the persona as a system prompt
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}.\n\n{backstory}\n\nYour goal: {goal}\n\n\
             Use the available tools when you need data. Give your final \
             answer as plain text once you have what you need.",
            role = self.role,
            backstory = self.backstory,
            goal = self.goal,
        )
    }
}

/// An agent with a persona that runs the LLM tool loop
pub struct RoleAgent {
    executor: RoleExecutor,
    persona: Persona,
    budget: Option<StepBudget>,
}

impl RoleAgent {
    /// Create a role agent
    ///
    /// The persona's system prompt overrides whatever the config carried.
    pub fn new(
        persona: Persona,
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        mut config: ExecutorConfig,
    ) -> Result<Self> {
        config.system_prompt = Some(persona.system_prompt());

        let executor = RoleExecutorBuilder::new()
            .provider(provider)
            .tool_registry(tools)
            .config(config)
            .build()?;

        Ok(Self {
            executor,
            persona,
            budget: None,
        })
    }

    /// Attach a shared crew step budget
    pub fn with_budget(mut self, budget: StepBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    /// The agent's persona
    pub fn persona(&self) -> &Persona {
        &self.persona
    }
}

#[async_trait]
impl Agent for RoleAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        self.executor
            .run_with_budget(input, self.budget.as_ref())
            .await
    }

    fn name(&self) -> &str {
        &self.persona.role
    }
}
