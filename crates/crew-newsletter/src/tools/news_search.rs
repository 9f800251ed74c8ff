//! Tool for searching recent market news

use crate::api::DuckDuckGoClient;
use crate::error::Result;
use crew_core::Result as CoreResult;
use crew_llm::tools::schema;
use crew_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Tool that searches recent news via DuckDuckGo
pub struct NewsSearchTool {
    client: Arc<DuckDuckGoClient>,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct NewsSearchParams {
    query: String,
}

impl NewsSearchTool {
    /// Create a new news search tool returning at most `limit` results
    pub fn new(client: Arc<DuckDuckGoClient>, limit: usize) -> Self {
        Self { client, limit }
    }

    async fn search(&self, params: NewsSearchParams) -> Result<Value> {
        let articles = self.client.search_news(&params.query, self.limit).await?;

        let results: Vec<Value> = articles
            .iter()
            .map(|a| {
                json!({
                    "title": a.title,
                    "source": a.source,
                    "date": a.date,
                    "excerpt": a.excerpt,
                    "url": a.url,
                })
            })
            .collect();

        Ok(json!({
            "query": params.query,
            "result_count": results.len(),
            "results": results,
        }))
    }
}

#[async_trait]
impl Tool for NewsSearchTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let params: NewsSearchParams = serde_json::from_value(params)
            .map_err(|e| crew_core::Error::ProcessingFailed(format!("Invalid parameters: {e}")))?;

        self.search(params)
            .await
            .map_err(|e| crew_core::Error::ProcessingFailed(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "news_search"
    }

    fn description(&self) -> &'static str {
        "Search recent news articles for a query using the DuckDuckGo news \
         backend. Returns headlines, sources, publish dates and excerpts."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "query": schema::string("Search terms (e.g., 'AAPL stock news')"),
            }),
            vec!["query"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_metadata() {
        let tool = NewsSearchTool::new(Arc::new(DuckDuckGoClient::new(20)), 10);

        assert_eq!(tool.name(), "news_search");
        assert!(!tool.description().is_empty());

        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["required"][0], "query");
    }

    #[tokio::test]
    async fn test_invalid_params_rejected() {
        let tool = NewsSearchTool::new(Arc::new(DuckDuckGoClient::new(20)), 10);
        let result = tool.execute(json!({"search": "AAPL"})).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_execute_searches_news() {
        let tool = NewsSearchTool::new(Arc::new(DuckDuckGoClient::new(20)), 10);
        let result = tool.execute(json!({"query": "AAPL stock"})).await.unwrap();

        assert_eq!(result["query"], "AAPL stock");
        assert!(result["result_count"].as_u64().unwrap() <= 10);
    }
}
