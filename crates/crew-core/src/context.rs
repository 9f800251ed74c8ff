//! Execution context for pipeline runs
//!
//! The `Context` struct is a key-value store threaded through every task in
//! a pipeline run. It accumulates each task's output so dependent tasks and
//! their agents can read what earlier producers wrote.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys for pipeline runs
pub mod keys {
    /// Prefix for stored task outputs; full key is `task_output:<task_id>`
    pub const TASK_OUTPUT_PREFIX: &str = "task_output:";
}

/// Context passed between pipeline stages
///
/// # Example
///
/// ```
/// use crew_core::Context;
///
/// let mut ctx = Context::new();
/// ctx.set_task_output("price_trend", "AAPL, price UP");
///
/// assert_eq!(ctx.task_output("price_trend"), Some("AAPL, price UP"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Key-value storage for context data
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Task Outputs ===========

    /// Store a completed task's output
    pub fn set_task_output(&mut self, task_id: &str, output: impl Into<String>) {
        self.insert(
            format!("{}{task_id}", keys::TASK_OUTPUT_PREFIX),
            serde_json::json!(output.into()),
        );
    }

    /// Get a completed task's output, if the task has run
    pub fn task_output(&self, task_id: &str) -> Option<&str> {
        self.get(&format!("{}{task_id}", keys::TASK_OUTPUT_PREFIX))
            .and_then(|v| v.as_str())
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    ///
    /// Serializes the value to JSON before storing.
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    ///
    /// Deserializes the JSON value into the specified type.
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        value: i32,
        text: String,
    }

    #[test]
    fn test_basic_operations() {
        let mut ctx = Context::new();
        assert!(ctx.is_empty());

        ctx.insert("key", serde_json::json!("value"));
        assert_eq!(ctx.len(), 1);
        assert!(ctx.contains_key("key"));
        assert_eq!(ctx.get("key"), Some(&serde_json::json!("value")));

        ctx.remove("key");
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_typed_insert_get() {
        let mut ctx = Context::new();
        let data = TestData {
            value: 42,
            text: "hello".to_string(),
        };

        ctx.insert_typed("test", &data).unwrap();

        let retrieved: TestData = ctx.get_typed("test").unwrap().unwrap();
        assert_eq!(retrieved, data);
    }

    #[test]
    fn test_task_outputs() {
        let mut ctx = Context::new();
        assert_eq!(ctx.task_output("price_trend"), None);

        ctx.set_task_output("price_trend", "AAPL, price UP");
        ctx.set_task_output("news_digest", "fear/greed 62");

        assert_eq!(ctx.task_output("price_trend"), Some("AAPL, price UP"));
        assert_eq!(ctx.task_output("news_digest"), Some("fear/greed 62"));
    }

    #[test]
    fn test_get_typed_missing_key() {
        let ctx = Context::new();
        let result: crate::Result<Option<TestData>> = ctx.get_typed("missing");
        assert!(result.unwrap().is_none());
    }
}
