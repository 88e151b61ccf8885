//! Market-data façade: company info, prices, history, corporate actions and
//! the analytics derived from them.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::analytics::{self, MovingAverages, ReturnSeries, VolatilitySeries};
use crate::error::{Error, Result};
use crate::model::{
    Dividend, Granularity, HistoryQuery, HistoryRange, Interval, Period, PriceSeries, Split,
    StockInfo, Symbol,
};
use crate::provider::{Chart, ChartRequest, MarketDataProvider};

pub struct MarketDataClient<P> {
    provider: P,
}

impl<P: MarketDataProvider> MarketDataClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub async fn get_stock_info(&self, symbol: &Symbol) -> Result<StockInfo> {
        self.provider
            .quote(symbol)
            .await?
            .ok_or_else(|| Error::lookup(format!("No info found for symbol {}", symbol)))
    }

    /// Latest close, preferring one-minute bars and falling back to daily.
    pub async fn get_current_price(&self, symbol: &Symbol) -> Result<f64> {
        let range = HistoryRange::Period(Period::OneDay);
        let intraday = ChartRequest::new(symbol.clone(), range, Interval::OneMinute);
        let mut series = self.fetch_series(&intraday).await?;

        if series.is_empty() {
            debug!(%symbol, "no intraday bars, falling back to daily");
            let daily = ChartRequest::new(symbol.clone(), range, Interval::OneDay);
            series = self.fetch_series(&daily).await?;
        }

        series
            .last()
            .map(|bar| bar.close)
            .ok_or_else(|| Error::lookup(format!("No current price data available for {}", symbol)))
    }

    pub async fn get_historical_data(
        &self,
        symbol: &Symbol,
        query: &HistoryQuery,
    ) -> Result<PriceSeries> {
        let range = query.validate()?;
        let request = ChartRequest::new(symbol.clone(), range, query.interval);
        let series = self.fetch_series(&request).await?;
        if series.is_empty() {
            return Err(Error::lookup(format!("No data found for symbol {}", symbol)));
        }
        Ok(series)
    }

    /// History for several symbols, fetched one after another. A symbol that
    /// fails maps to an empty series instead of failing the batch.
    pub async fn get_multiple_stocks(
        &self,
        symbols: &[Symbol],
        query: &HistoryQuery,
    ) -> Result<BTreeMap<Symbol, PriceSeries>> {
        query.validate()?;

        let mut results = BTreeMap::new();
        for symbol in symbols {
            let series = match self.get_historical_data(symbol, query).await {
                Ok(series) => series,
                Err(e) => {
                    warn!(%symbol, error = %e, "could not fetch data");
                    PriceSeries::empty(symbol.clone())
                }
            };
            results.insert(symbol.clone(), series);
        }
        Ok(results)
    }

    pub async fn get_dividends(&self, symbol: &Symbol) -> Result<Vec<Dividend>> {
        let Some(chart) = self.fetch_events(symbol).await? else {
            return Ok(Vec::new());
        };
        let mut dividends = chart.dividends;
        dividends.sort_by_key(|d| d.timestamp);
        Ok(dividends)
    }

    pub async fn get_splits(&self, symbol: &Symbol) -> Result<Vec<Split>> {
        let Some(chart) = self.fetch_events(symbol).await? else {
            return Ok(Vec::new());
        };
        let mut splits = chart.splits;
        splits.sort_by_key(|s| s.timestamp);
        Ok(splits)
    }

    pub fn calculate_returns(&self, series: &PriceSeries, granularity: Granularity) -> ReturnSeries {
        analytics::calculate_returns(series, granularity)
    }

    pub fn get_moving_averages(
        &self,
        series: &PriceSeries,
        windows: &[usize],
    ) -> Result<MovingAverages> {
        analytics::moving_averages(series, windows)
    }

    pub fn get_volatility(&self, series: &PriceSeries, window: usize) -> Result<VolatilitySeries> {
        analytics::volatility(series, window)
    }

    async fn fetch_series(&self, request: &ChartRequest) -> Result<PriceSeries> {
        debug!(symbol = %request.symbol, interval = %request.interval, "fetching chart");
        let chart = self.provider.chart(request).await?;
        let series = PriceSeries::new(request.symbol.clone(), chart.bars);
        Ok(match chart.utc_offset {
            Some(offset) => series.with_utc_offset(offset),
            None => series,
        })
    }

    /// Full-history chart with events; an unknown symbol has no events.
    async fn fetch_events(&self, symbol: &Symbol) -> Result<Option<Chart>> {
        let request = ChartRequest::new(
            symbol.clone(),
            HistoryRange::Period(Period::Max),
            Interval::OneDay,
        )
        .with_events();

        match self.provider.chart(&request).await {
            Ok(chart) => Ok(Some(chart)),
            Err(Error::Lookup(message)) => {
                debug!(%symbol, %message, "no corporate actions");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
