//! The three newsletter roles

use crate::api::DuckDuckGoClient;
use crate::config::NewsletterConfig;
use crate::error::Result;
use crate::prompts;
use crate::tools::{NewsSearchTool, PriceHistoryTool};
use crew_llm::LlmProvider;
use crew_runtime::{ExecutorConfig, Persona, RoleAgent, StepBudget};
use crew_tools::ToolRegistry;
use std::collections::HashMap;
use std::sync::Arc;

/// The assembled role agents of a newsletter crew
pub struct CrewRoles {
    /// Reads price history and calls the trend
    pub trend_analyst: Arc<RoleAgent>,
    /// Searches news and scores fear/greed
    pub news_analyst: Arc<RoleAgent>,
    /// Writes the final newsletter
    pub writer: Arc<RoleAgent>,
}

/// Build the three role agents for a run
///
/// Goals are templates; the kickoff inputs (ticker) are rendered into
/// them here so each persona addresses the concrete stock.
pub fn build_roles(
    config: &NewsletterConfig,
    provider: Arc<dyn LlmProvider>,
    inputs: &HashMap<String, String>,
    budget: &StepBudget,
) -> Result<CrewRoles> {
    let executor_config = |max_steps: usize| ExecutorConfig {
        max_steps,
        model: config.agent_model.clone(),
        system_prompt: None,
        max_tokens: 4096,
        temperature: Some(0.7),
    };

    // Trend analyst: price history tool only
    let price_tools = Arc::new(ToolRegistry::new());
    price_tools.register(Arc::new(PriceHistoryTool::new(
        config.window_start,
        config.window_end,
    )));

    let trend_analyst = RoleAgent::new(
        Persona::new(
            prompts::TREND_ANALYST_ROLE,
            prompts::render(prompts::TREND_ANALYST_GOAL, inputs)?,
            prompts::TREND_ANALYST_BACKSTORY,
        ),
        provider.clone(),
        price_tools,
        executor_config(config.trend_max_steps),
    )?
    .with_budget(budget.clone());

    // News analyst: news search tool only
    let news_tools = Arc::new(ToolRegistry::new());
    news_tools.register(Arc::new(NewsSearchTool::new(
        Arc::new(DuckDuckGoClient::new(20)),
        config.news_limit,
    )));

    let news_analyst = RoleAgent::new(
        Persona::new(
            prompts::NEWS_ANALYST_ROLE,
            prompts::render(prompts::NEWS_ANALYST_GOAL, inputs)?,
            prompts::NEWS_ANALYST_BACKSTORY,
        ),
        provider.clone(),
        news_tools,
        executor_config(config.news_max_steps),
    )?
    .with_budget(budget.clone());

    // Writer: no tools, works from the analysts' outputs
    let writer = RoleAgent::new(
        Persona::new(
            prompts::WRITER_ROLE,
            prompts::WRITER_GOAL,
            prompts::WRITER_BACKSTORY,
        ),
        provider,
        Arc::new(ToolRegistry::new()),
        executor_config(config.writer_max_steps),
    )?
    .with_budget(budget.clone());

    Ok(CrewRoles {
        trend_analyst: Arc::new(trend_analyst),
        news_analyst: Arc::new(news_analyst),
        writer: Arc::new(writer),
    })
}
