//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Core trait implemented by every pipeline participant
///
/// Input and output are plain strings: an agent receives a rendered task
/// prompt and returns free text. Anything structured (task outputs, the
/// ticker under analysis) travels through the [`Context`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;
}
