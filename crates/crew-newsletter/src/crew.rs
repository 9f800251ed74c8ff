//! Newsletter crew assembly and kickoff
//!
//! Wires the three roles and their tasks into a managed pipeline and runs
//! it for a ticker. The writer task depends on both analysis tasks; the
//! manager model composes the final deliverable from all task outputs.

use crate::config::{NewsletterConfig, ProviderKind};
use crate::error::{NewsletterError, Result};
use crate::prompts;
use crate::roles::{CrewRoles, build_roles};
use chrono::Utc;
use crew_llm::LlmProvider;
use crew_pipeline::{Pipeline, PipelineResult, Process, Task};
use crew_runtime::StepBudget;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// The stock newsletter crew
pub struct NewsletterCrew {
    config: NewsletterConfig,
    provider: Arc<dyn LlmProvider>,
    manager: Arc<dyn LlmProvider>,
}

impl NewsletterCrew {
    /// Create a crew with explicit providers
    pub fn new(
        config: NewsletterConfig,
        provider: Arc<dyn LlmProvider>,
        manager: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            config,
            provider,
            manager,
        }
    }

    /// Create a crew from the configured keyring file
    ///
    /// Reads the `chatgpt` and `gemini` entries from `config.keyring_path`,
    /// exports them as provider API keys, then builds the providers from
    /// the environment.
    pub fn from_keyring(config: NewsletterConfig) -> Result<Self> {
        crew_utils::load_into_env(&config.keyring_path)?;
        Self::from_env(config)
    }

    /// Create a crew with providers built from the environment
    ///
    /// Reads `GEMINI_API_KEY` / `OPENAI_API_KEY` depending on the backend
    /// each set of roles is configured for (see [`Self::from_keyring`]).
    pub fn from_env(config: NewsletterConfig) -> Result<Self> {
        let provider = provider_from_env(config.agent_provider)?;
        let manager = if config.manager_provider == config.agent_provider {
            provider.clone()
        } else {
            provider_from_env(config.manager_provider)?
        };

        Ok(Self {
            config,
            provider,
            manager,
        })
    }

    /// The crew's configuration
    pub fn config(&self) -> &NewsletterConfig {
        &self.config
    }

    /// Run the crew for a ticker and return the newsletter
    pub async fn run(&self, ticker: &str) -> Result<PipelineResult> {
        let inputs = HashMap::from([
            ("ticker".to_string(), ticker.to_uppercase()),
            ("date".to_string(), Utc::now().format("%Y-%m-%d").to_string()),
        ]);

        info!(ticker = %inputs["ticker"], budget = self.config.crew_budget, "Kicking off newsletter crew");

        let budget = StepBudget::new(self.config.crew_budget);
        let roles = build_roles(&self.config, self.provider.clone(), &inputs, &budget)?;
        let pipeline = build_pipeline(&self.config, roles, self.manager.clone())?;

        let result = pipeline.kickoff(inputs).await?;
        info!(
            final_length = result.final_output.len(),
            tasks = result.task_outputs.len(),
            "Newsletter crew finished"
        );

        Ok(result)
    }
}

/// Build a provider for the given backend from the environment
fn provider_from_env(kind: ProviderKind) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match kind {
        ProviderKind::Gemini => Arc::new(
            crew_llm::providers::GeminiProvider::from_env()
                .map_err(|e| NewsletterError::ConfigError(e.to_string()))?,
        ),
        ProviderKind::OpenAi => Arc::new(
            crew_llm::providers::OpenAiProvider::from_env()
                .map_err(|e| NewsletterError::ConfigError(e.to_string()))?,
        ),
    };

    Ok(provider)
}

/// Assemble the task pipeline for a run
fn build_pipeline(
    config: &NewsletterConfig,
    roles: CrewRoles,
    manager: Arc<dyn LlmProvider>,
) -> Result<Pipeline> {
    let pipeline = Pipeline::builder()
        .add_task(Task::new(
            prompts::TASK_PRICE_TREND,
            prompts::PRICE_TREND_DESCRIPTION,
            prompts::PRICE_TREND_EXPECTED,
            roles.trend_analyst,
        ))
        .add_task(Task::new(
            prompts::TASK_NEWS_DIGEST,
            prompts::NEWS_DIGEST_DESCRIPTION,
            prompts::NEWS_DIGEST_EXPECTED,
            roles.news_analyst,
        ))
        .add_task(
            Task::new(
                prompts::TASK_WRITE_NEWSLETTER,
                prompts::WRITE_NEWSLETTER_DESCRIPTION,
                prompts::WRITE_NEWSLETTER_EXPECTED,
                roles.writer,
            )
            .depends_on([prompts::TASK_PRICE_TREND, prompts::TASK_NEWS_DIGEST]),
        )
        .process(Process::Managed {
            provider: manager,
            model: config.manager_model.clone(),
        })
        .build()?;

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crew_llm::{
        CompletionRequest, CompletionResponse, LlmError, Message, StopReason, TokenUsage,
    };
    use crew_runtime::StepBudget;

    /// Provider that always completes immediately with a fixed answer
    struct OneShotProvider(&'static str);

    #[async_trait]
    impl LlmProvider for OneShotProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                message: Message::assistant(self.0),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &'static str {
            "oneshot"
        }
    }

    #[test]
    fn test_writer_depends_on_both_analyses() {
        let config = NewsletterConfig::default();
        let inputs = HashMap::from([
            ("ticker".to_string(), "AAPL".to_string()),
            ("date".to_string(), "2024-08-08".to_string()),
        ]);
        let budget = StepBudget::new(config.crew_budget);
        let roles = build_roles(
            &config,
            Arc::new(OneShotProvider("unused")),
            &inputs,
            &budget,
        )
        .unwrap();

        let pipeline =
            build_pipeline(&config, roles, Arc::new(OneShotProvider("unused"))).unwrap();

        let writer = pipeline
            .tasks()
            .iter()
            .find(|t| t.id == prompts::TASK_WRITE_NEWSLETTER)
            .unwrap();
        assert_eq!(
            writer.depends_on,
            vec![prompts::TASK_PRICE_TREND, prompts::TASK_NEWS_DIGEST]
        );

        assert_eq!(
            pipeline.execution_order(),
            vec![
                prompts::TASK_PRICE_TREND,
                prompts::TASK_NEWS_DIGEST,
                prompts::TASK_WRITE_NEWSLETTER
            ]
        );
    }

    #[test]
    fn test_from_keyring_loads_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyring.txt");
        std::fs::write(&path, "chatgpt: sk-test-openai\ngemini: test-gemini\n").unwrap();

        let config = NewsletterConfig::builder()
            .keyring_path(&path)
            .build()
            .unwrap();

        let crew = NewsletterCrew::from_keyring(config).unwrap();
        assert_eq!(crew.config().keyring_path, path);
    }

    #[test]
    fn test_from_keyring_missing_file() {
        let config = NewsletterConfig::builder()
            .keyring_path("does/not/exist.txt")
            .build()
            .unwrap();

        let result = NewsletterCrew::from_keyring(config);
        assert!(matches!(result, Err(NewsletterError::KeyringError(_))));
    }

    #[tokio::test]
    async fn test_run_produces_result_for_every_task() {
        let config = NewsletterConfig::default();
        let crew = NewsletterCrew::new(
            config,
            Arc::new(OneShotProvider("analysis text")),
            Arc::new(OneShotProvider("# AAPL Newsletter")),
        );

        let result = crew.run("aapl").await.unwrap();

        assert_eq!(result.final_output, "# AAPL Newsletter");
        assert!(!result.final_output.is_empty());
        assert_eq!(result.task_outputs.len(), 3);
        assert_eq!(
            result.task_output(prompts::TASK_PRICE_TREND),
            Some("analysis text")
        );
    }
}
