//! Provider contracts the façades are built on.
//!
//! The façades never talk HTTP themselves; they hold a provider value passed
//! in at construction. [`crate::api::YahooClient`] and
//! [`crate::api::TipRanksClient`] are the network implementations, tests plug
//! in fakes.

use chrono::FixedOffset;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::model::{Bar, Dividend, HistoryRange, Interval, NewsArticle, Split, StockInfo, Symbol};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Parameters for one chart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: Symbol,
    pub range: HistoryRange,
    pub interval: Interval,
    /// Ask for dividend and split events alongside the bars.
    pub events: bool,
}

impl ChartRequest {
    pub fn new(symbol: Symbol, range: HistoryRange, interval: Interval) -> Self {
        Self {
            symbol,
            range,
            interval,
            events: false,
        }
    }

    pub fn with_events(mut self) -> Self {
        self.events = true;
        self
    }
}

/// Decoded chart payload. Bars may arrive unsorted; events are unsorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    pub bars: Vec<Bar>,
    pub dividends: Vec<Dividend>,
    pub splits: Vec<Split>,
    /// Exchange offset from UTC, when the provider reports one.
    pub utc_offset: Option<FixedOffset>,
}

/// Market data source.
pub trait MarketDataProvider: Send + Sync {
    /// Company metadata, or `None` when the provider has no record of the
    /// symbol.
    fn quote<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Option<StockInfo>>;

    /// Historical bars and, when requested, corporate actions.
    ///
    /// Returns [`crate::Error::Lookup`] for symbols the provider does not know.
    fn chart<'a>(&'a self, request: &'a ChartRequest) -> ProviderFuture<'a, Chart>;
}

/// News source.
pub trait NewsProvider: Send + Sync {
    /// Short lowercase source name, e.g. `yfinance`.
    fn name(&self) -> &str;

    /// Up to `count` recent articles for `symbol`, in provider order.
    fn news<'a>(&'a self, symbol: &'a Symbol, count: usize)
    -> ProviderFuture<'a, Vec<NewsArticle>>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for std::sync::Arc<P> {
    fn quote<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Option<StockInfo>> {
        (**self).quote(symbol)
    }

    fn chart<'a>(&'a self, request: &'a ChartRequest) -> ProviderFuture<'a, Chart> {
        (**self).chart(request)
    }
}

impl<P: NewsProvider + ?Sized> NewsProvider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn news<'a>(
        &'a self,
        symbol: &'a Symbol,
        count: usize,
    ) -> ProviderFuture<'a, Vec<NewsArticle>> {
        (**self).news(symbol, count)
    }
}
