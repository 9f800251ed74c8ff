//! Tool for fetching stock price history

use crate::api::MarketDataClient;
use crate::error::Result;
use chrono::NaiveDate;
use crew_core::Result as CoreResult;
use crew_llm::tools::schema;
use crew_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

/// Tool that fetches daily price history over a fixed date window
///
/// The window is set when the tool is built; the LLM only supplies the
/// symbol, matching how the trend analyst is briefed.
pub struct PriceHistoryTool {
    client: MarketDataClient,
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct PriceHistoryParams {
    symbol: String,
}

impl PriceHistoryTool {
    /// Create a new price history tool over the given window
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            client: MarketDataClient::new(),
            start,
            end,
        }
    }

    async fn fetch(&self, params: PriceHistoryParams) -> Result<Value> {
        let symbol = params.symbol.to_uppercase();
        let bars = self.client.price_history(&symbol, self.start, self.end).await?;
        Ok(self.summarize(&symbol, &bars))
    }

    /// Condense the bars into the JSON report handed back to the LLM
    fn summarize(&self, symbol: &str, bars: &[crate::api::DailyBar]) -> Value {
        let closes: Vec<Value> = bars
            .iter()
            .map(|b| {
                json!({
                    "date": b.timestamp.format("%Y-%m-%d").to_string(),
                    "close": b.close,
                })
            })
            .collect();

        let first_close = bars.first().map_or(0.0, |b| b.close);
        let last_close = bars.last().map_or(0.0, |b| b.close);
        let change_pct = if first_close > 0.0 {
            (last_close - first_close) / first_close * 100.0
        } else {
            0.0
        };
        let high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);

        json!({
            "symbol": symbol,
            "window": {
                "start": self.start.to_string(),
                "end": self.end.to_string(),
            },
            "data_points": bars.len(),
            "first_close": first_close,
            "last_close": last_close,
            "change_pct": change_pct,
            "high": high,
            "low": low,
            "daily_closes": closes,
        })
    }
}

#[async_trait]
impl Tool for PriceHistoryTool {
    async fn execute(&self, params: Value) -> CoreResult<Value> {
        let params: PriceHistoryParams = serde_json::from_value(params)
            .map_err(|e| crew_core::Error::ProcessingFailed(format!("Invalid parameters: {e}")))?;

        self.fetch(params)
            .await
            .map_err(|e| crew_core::Error::ProcessingFailed(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "price_history"
    }

    fn description(&self) -> &'static str {
        "Fetch daily stock price history for a given symbol from Yahoo Finance \
         over the analysis window. Returns closing prices, the overall change \
         and the high/low of the period."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol (e.g., 'AAPL', 'GOOGL')"),
            }),
            vec!["symbol"],
        )
    }
}
