//! Thin Yahoo Finance and TipRanks client.
//!
//! [`MarketDataClient`] wraps quotes, price history and corporate actions and
//! derives returns, moving averages and rolling volatility from a
//! [`PriceSeries`]. [`NewsClient`] wraps per-symbol news, and
//! [`UnifiedNewsClient`] merges several news sources.
//!
//! Both façades take their provider at construction:
//!
//! ```rust,ignore
//! use finwrap::{Config, MarketDataClient, HistoryQuery, Period, Symbol, YahooClient};
//!
//! let config = Config::default();
//! let yahoo = YahooClient::new(config.yahoo.clone(), config.timeout())?;
//! let market = MarketDataClient::new(yahoo);
//! let series = market
//!     .get_historical_data(&Symbol::new("AAPL")?, &HistoryQuery::period(Period::OneMonth))
//!     .await?;
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod market;
pub mod model;
pub mod news;
pub mod provider;

pub use analytics::{MovingAverages, OptionalPoint, ReturnSeries, SeriesPoint, VolatilitySeries};
pub use api::{HttpClient, TipRanksClient, YahooClient};
pub use config::Config;
pub use error::{Error, Result};
pub use market::MarketDataClient;
pub use model::{
    Bar, Dividend, Granularity, HistoryQuery, HistoryRange, Interval, NewsArticle, Period,
    PriceSeries, Split, StockInfo, Symbol,
};
pub use news::{NewsClient, UnifiedNews, UnifiedNewsClient};
pub use provider::{Chart, ChartRequest, MarketDataProvider, NewsProvider};
