#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use finwrap::provider::ProviderFuture;
use finwrap::{
    Bar, Chart, ChartRequest, Error, Interval, MarketDataProvider, NewsArticle, NewsProvider,
    PriceSeries, StockInfo, Symbol,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn sym(code: &str) -> Symbol {
    Symbol::new(code).unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 14, 30, 0).unwrap()
}

pub fn make_bar(ts: DateTime<Utc>, close: f64) -> Bar {
    Bar {
        timestamp: ts,
        open: close - 1.0,
        high: close + 2.0,
        low: close - 2.0,
        close,
        volume: 1_000_000,
    }
}

/// One bar per calendar day starting 2024-01-01.
pub fn daily_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let start = day(2024, 1, 1);
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, c)| make_bar(start + Duration::days(i as i64), *c))
        .collect();
    PriceSeries::new(sym(symbol), bars)
}

pub fn chart_of(bars: Vec<Bar>) -> Chart {
    Chart {
        bars,
        ..Chart::default()
    }
}

pub fn make_info(symbol: &str, short_name: &str) -> StockInfo {
    let mut fields = std::collections::BTreeMap::new();
    fields.insert("symbol".to_string(), serde_json::json!(symbol));
    fields.insert("shortName".to_string(), serde_json::json!(short_name));
    StockInfo {
        symbol: sym(symbol),
        fields,
    }
}

pub fn make_article(title: &str, publisher: &str, ts: Option<i64>, summary: Option<&str>) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        publisher: publisher.to_string(),
        published_at: ts.and_then(|t| DateTime::from_timestamp(t, 0)),
        link: format!("https://news.example.com/{}", title.len()),
        summary: summary.map(|s| s.to_string()),
        thumbnail: None,
        content_type: "STORY".to_string(),
        sentiment: None,
    }
}

/// In-memory market data source that records every chart request.
#[derive(Default)]
pub struct FakeMarketProvider {
    pub charts: HashMap<String, Chart>,
    pub intraday: HashMap<String, Chart>,
    pub quotes: HashMap<String, StockInfo>,
    pub failures: HashMap<String, String>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<ChartRequest>>,
}

impl FakeMarketProvider {
    pub fn with_chart(mut self, symbol: &str, chart: Chart) -> Self {
        self.charts.insert(symbol.to_string(), chart);
        self
    }

    pub fn with_intraday(mut self, symbol: &str, chart: Chart) -> Self {
        self.intraday.insert(symbol.to_string(), chart);
        self
    }

    pub fn with_quote(mut self, info: StockInfo) -> Self {
        self.quotes.insert(info.symbol.to_string(), info);
        self
    }

    pub fn with_failure(mut self, symbol: &str, message: &str) -> Self {
        self.failures.insert(symbol.to_string(), message.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<ChartRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn lookup_chart(&self, request: &ChartRequest) -> finwrap::Result<Chart> {
        let key = request.symbol.as_str();
        if let Some(message) = self.failures.get(key) {
            return Err(Error::external(message.clone()));
        }
        let known = self.charts.contains_key(key) || self.intraday.contains_key(key);
        if !known {
            return Err(Error::lookup(format!("No data found, symbol may be delisted: {}", key)));
        }
        if request.interval == Interval::OneMinute {
            return Ok(self.intraday.get(key).cloned().unwrap_or_default());
        }
        Ok(self.charts.get(key).cloned().unwrap_or_default())
    }
}

impl MarketDataProvider for FakeMarketProvider {
    fn quote<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Option<StockInfo>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.failures.get(symbol.as_str()) {
                return Err(Error::external(message.clone()));
            }
            Ok(self.quotes.get(symbol.as_str()).cloned())
        })
    }

    fn chart<'a>(&'a self, request: &'a ChartRequest) -> ProviderFuture<'a, Chart> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.lookup_chart(request)
        })
    }
}

/// In-memory news source returning its articles in stored order.
pub struct FakeNewsProvider {
    pub name: String,
    pub articles: Vec<NewsArticle>,
    pub failure: Option<String>,
    pub calls: AtomicUsize,
    pub requested: Mutex<Vec<usize>>,
}

impl FakeNewsProvider {
    pub fn new(name: &str, articles: Vec<NewsArticle>) -> Self {
        Self {
            name: name.to_string(),
            articles,
            failure: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(name, Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_counts(&self) -> Vec<usize> {
        self.requested.lock().unwrap().clone()
    }
}

impl NewsProvider for FakeNewsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn news<'a>(
        &'a self,
        _symbol: &'a Symbol,
        count: usize,
    ) -> ProviderFuture<'a, Vec<NewsArticle>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(count);
            if let Some(message) = &self.failure {
                return Err(Error::external(message.clone()));
            }
            Ok(self.articles.iter().take(count).cloned().collect())
        })
    }
}
