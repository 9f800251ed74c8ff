//! Yahoo Finance market data client

use crate::error::{NewsletterError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// One day of price data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading day (UTC)
    pub timestamp: DateTime<Utc>,
    /// Opening price
    pub open: f64,
    /// Daily high
    pub high: f64,
    /// Daily low
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: u64,
    /// Adjusted close
    pub adjclose: f64,
}

/// Market data client backed by Yahoo Finance
pub struct MarketDataClient {}

impl MarketDataClient {
    /// Create a new market data client
    pub fn new() -> Self {
        Self {}
    }

    /// Fetch daily price history for a symbol over a date window
    ///
    /// The end date is exclusive, matching how history downloads are
    /// usually specified.
    pub async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>> {
        validate_symbol(symbol)?;

        let provider = yahoo::YahooConnector::new()
            .map_err(|e| NewsletterError::MarketDataError(e.to_string()))?;

        let start_odt = to_offset_datetime(start)?;
        let end_odt = to_offset_datetime(end)?;

        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| NewsletterError::MarketDataError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| NewsletterError::MarketDataError(e.to_string()))?;

        if quotes.is_empty() {
            return Err(NewsletterError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no quotes between {start} and {end}"),
            });
        }

        Ok(quotes
            .iter()
            .map(|q| DailyBar {
                timestamp: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
                adjclose: q.adjclose,
            })
            .collect())
    }
}

/// Reject symbols Yahoo would never accept before going to the network
///
/// Tickers are short and use letters, digits and a handful of separators
/// (`BRK-B`, `^GSPC`, `BTC-USD`).
fn validate_symbol(symbol: &str) -> Result<()> {
    let well_formed = !symbol.is_empty()
        && symbol.len() <= 12
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

    if well_formed {
        Ok(())
    } else {
        Err(NewsletterError::InvalidSymbol(symbol.to_string()))
    }
}

/// Convert a calendar date to the time crate's OffsetDateTime at midnight UTC
fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| NewsletterError::MarketDataError(format!("Invalid date: {date}")))?
        .and_utc()
        .timestamp();

    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| NewsletterError::MarketDataError(format!("Invalid timestamp: {e}")))
}

impl Default for MarketDataClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MarketDataClient {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_conversion() {
        let date = NaiveDate::from_ymd_opt(2023, 8, 8).unwrap();
        let odt = to_offset_datetime(date).unwrap();
        assert_eq!(odt.year(), 2023);
        assert_eq!(odt.month() as u8, 8);
        assert_eq!(odt.day(), 8);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_price_history() {
        let client = MarketDataClient::new();
        let bars = client
            .price_history(
                "AAPL",
                NaiveDate::from_ymd_opt(2023, 8, 8).unwrap(),
                NaiveDate::from_ymd_opt(2024, 8, 8).unwrap(),
            )
            .await
            .unwrap();

        assert!(!bars.is_empty());
        assert!(bars[0].close > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_symbol() {
        let client = MarketDataClient::new();
        let result = client
            .price_history(
                "ZZZZXQ",
                NaiveDate::from_ymd_opt(2023, 8, 8).unwrap(),
                NaiveDate::from_ymd_opt(2024, 8, 8).unwrap(),
            )
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_malformed_symbol_rejected_before_fetch() {
        let client = MarketDataClient::new();
        let start = NaiveDate::from_ymd_opt(2023, 8, 8).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 8, 8).unwrap();

        for symbol in ["", "AAPL; DROP", "WAY_TOO_LONG_SYMBOL", "A PL"] {
            let result = client.price_history(symbol, start, end).await;
            assert!(
                matches!(result, Err(NewsletterError::InvalidSymbol(_))),
                "expected InvalidSymbol for {symbol:?}"
            );
        }
    }

    #[test]
    fn test_symbol_validation_accepts_real_shapes() {
        for symbol in ["AAPL", "BRK-B", "^GSPC", "BTC-USD", "BRK.B"] {
            assert!(validate_symbol(symbol).is_ok(), "rejected {symbol:?}");
        }
    }
}
