//! Configuration for the newsletter crew

use crate::error::{NewsletterError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// LLM backend for a set of roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Gemini (default, matching the shipped models)
    #[default]
    Gemini,
    /// OpenAI Chat Completions
    OpenAi,
}

/// Configuration for a newsletter crew run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterConfig {
    /// Path to the keyring file holding provider secrets
    pub keyring_path: PathBuf,

    /// Backend for the analyst and writer roles
    pub agent_provider: ProviderKind,

    /// Model used by the analyst and writer roles
    pub agent_model: String,

    /// Backend for the crew manager pass
    pub manager_provider: ProviderKind,

    /// Model used by the crew manager pass
    pub manager_model: String,

    /// Start of the price history window
    pub window_start: NaiveDate,

    /// End of the price history window (exclusive)
    pub window_end: NaiveDate,

    /// Maximum news results per search
    pub news_limit: usize,

    /// Shared step budget for the whole crew
    pub crew_budget: usize,

    /// Step limit for the trend analyst
    pub trend_max_steps: usize,

    /// Step limit for the news analyst
    pub news_max_steps: usize,

    /// Step limit for the writer
    pub writer_max_steps: usize,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            keyring_path: PathBuf::from("api_settings/keyring.txt"),
            agent_provider: ProviderKind::Gemini,
            agent_model: "gemini-1.0-pro".to_string(),
            manager_provider: ProviderKind::Gemini,
            manager_model: "gemini-1.0-pro".to_string(),
            // One year of history ending 2024-08-08
            window_start: NaiveDate::from_ymd_opt(2023, 8, 8).unwrap_or_default(),
            window_end: NaiveDate::from_ymd_opt(2024, 8, 8).unwrap_or_default(),
            news_limit: 10,
            crew_budget: 15,
            trend_max_steps: 5,
            news_max_steps: 10,
            writer_max_steps: 5,
        }
    }
}

impl NewsletterConfig {
    /// Create a new configuration builder
    pub fn builder() -> NewsletterConfigBuilder {
        NewsletterConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.window_start >= self.window_end {
            return Err(NewsletterError::ConfigError(format!(
                "Price window start {} must be before end {}",
                self.window_start, self.window_end
            )));
        }

        if self.news_limit == 0 {
            return Err(NewsletterError::ConfigError(
                "news_limit must be greater than 0".to_string(),
            ));
        }

        if self.crew_budget == 0 {
            return Err(NewsletterError::ConfigError(
                "crew_budget must be greater than 0".to_string(),
            ));
        }

        if self.agent_model.is_empty() || self.manager_model.is_empty() {
            return Err(NewsletterError::ConfigError(
                "Model names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for NewsletterConfig
#[derive(Debug, Default)]
pub struct NewsletterConfigBuilder {
    keyring_path: Option<PathBuf>,
    agent_provider: Option<ProviderKind>,
    agent_model: Option<String>,
    manager_provider: Option<ProviderKind>,
    manager_model: Option<String>,
    window_start: Option<NaiveDate>,
    window_end: Option<NaiveDate>,
    news_limit: Option<usize>,
    crew_budget: Option<usize>,
    trend_max_steps: Option<usize>,
    news_max_steps: Option<usize>,
    writer_max_steps: Option<usize>,
}

impl NewsletterConfigBuilder {
    /// Set the keyring file path
    pub fn keyring_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.keyring_path = Some(path.into());
        self
    }

    /// Set the backend for the roles
    pub fn agent_provider(mut self, provider: ProviderKind) -> Self {
        self.agent_provider = Some(provider);
        self
    }

    /// Set the model used by the roles
    pub fn agent_model(mut self, model: impl Into<String>) -> Self {
        self.agent_model = Some(model.into());
        self
    }

    /// Set the backend for the manager pass
    pub fn manager_provider(mut self, provider: ProviderKind) -> Self {
        self.manager_provider = Some(provider);
        self
    }

    /// Set the manager model
    pub fn manager_model(mut self, model: impl Into<String>) -> Self {
        self.manager_model = Some(model.into());
        self
    }

    /// Set the price history window
    pub fn window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.window_start = Some(start);
        self.window_end = Some(end);
        self
    }

    /// Set the maximum news results per search
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the shared crew step budget
    pub fn crew_budget(mut self, budget: usize) -> Self {
        self.crew_budget = Some(budget);
        self
    }

    /// Set per-role step limits
    pub fn role_step_limits(mut self, trend: usize, news: usize, writer: usize) -> Self {
        self.trend_max_steps = Some(trend);
        self.news_max_steps = Some(news);
        self.writer_max_steps = Some(writer);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<NewsletterConfig> {
        let defaults = NewsletterConfig::default();

        let config = NewsletterConfig {
            keyring_path: self.keyring_path.unwrap_or(defaults.keyring_path),
            agent_provider: self.agent_provider.unwrap_or(defaults.agent_provider),
            agent_model: self.agent_model.unwrap_or(defaults.agent_model),
            manager_provider: self.manager_provider.unwrap_or(defaults.manager_provider),
            manager_model: self.manager_model.unwrap_or(defaults.manager_model),
            window_start: self.window_start.unwrap_or(defaults.window_start),
            window_end: self.window_end.unwrap_or(defaults.window_end),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            crew_budget: self.crew_budget.unwrap_or(defaults.crew_budget),
            trend_max_steps: self.trend_max_steps.unwrap_or(defaults.trend_max_steps),
            news_max_steps: self.news_max_steps.unwrap_or(defaults.news_max_steps),
            writer_max_steps: self.writer_max_steps.unwrap_or(defaults.writer_max_steps),
        };

        config.validate()?;
        Ok(config)
    }
}
