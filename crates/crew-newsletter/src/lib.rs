//! Stock newsletter crew
//!
//! This crate assembles a three-role crew that produces a markdown stock
//! newsletter: a trend analyst reads a year of price history from Yahoo
//! Finance, a news analyst searches recent headlines through DuckDuckGo
//! and scores fear/greed, and a writer turns both reports into the final
//! newsletter under a manager model's supervision.
//!
//! # Example
//!
//! ```no_run
//! use crew_newsletter::{NewsletterConfig, NewsletterCrew};
//!
//! # async fn example() -> crew_newsletter::Result<()> {
//! let crew = NewsletterCrew::from_keyring(NewsletterConfig::default())?;
//! let result = crew.run("AAPL").await?;
//! println!("{}", result.final_output);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod crew;
pub mod error;
pub mod prompts;
pub mod roles;
pub mod tools;

pub use api::{DailyBar, DuckDuckGoClient, MarketDataClient, NewsArticle};
pub use config::{NewsletterConfig, NewsletterConfigBuilder, ProviderKind};
pub use crew::NewsletterCrew;
pub use error::{NewsletterError, Result};
pub use roles::{CrewRoles, build_roles};
pub use tools::{NewsSearchTool, PriceHistoryTool};
