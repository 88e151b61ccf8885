use crate::api::http::HttpClient;
use crate::config::YahooConfig;
use crate::error::{Error, Result};
use crate::model::{Bar, Dividend, HistoryRange, NewsArticle, Split, StockInfo, Symbol};
use crate::provider::{
    Chart, ChartRequest, MarketDataProvider, NewsProvider, ProviderFuture,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

// Chart API response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartResultItem>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResultItem {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    events: Option<ChartEvents>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "gmtoffset", default)]
    gmt_offset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: Option<HashMap<String, DividendEvent>>,
    #[serde(default)]
    splits: Option<HashMap<String, SplitEvent>>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    volume: Option<Vec<Option<f64>>>,
}

// Search API response structures (for news)
#[derive(Debug, Deserialize)]
struct SearchResponse {
    news: Option<Vec<SearchNewsItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchNewsItem {
    title: Option<String>,
    publisher: Option<String>,
    link: Option<String>,
    #[serde(rename = "providerPublishTime", default)]
    provider_publish_time: Option<i64>,
    #[serde(rename = "type", default)]
    content_type: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    content: Option<NewsContent>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsContent {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    resolutions: Vec<ThumbnailResolution>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailResolution {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<serde_json::Map<String, serde_json::Value>>,
    error: Option<serde_json::Value>,
}

/// Yahoo Finance client: quotes, charts with corporate actions, and news.
pub struct YahooClient {
    http: HttpClient,
    config: YahooConfig,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    pub fn new(config: YahooConfig, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder("")
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Referer", "https://finance.yahoo.com/")
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            config,
            crumb: Mutex::new(None),
        })
    }

    /// Fetch crumb and cookies from Yahoo Finance
    async fn fetch_crumb(&self) -> Result<String> {
        // Visiting the landing page sets the session cookies; the status is
        // irrelevant as long as the cookies arrive.
        let response = self.http.get(&self.config.base_url, &[]).await?;
        if let Some(crumb) = crumb_from_page(response.text().await) {
            return Ok(crumb);
        }

        let crumb = self.http.get_text(&self.config.crumb_url).await?;
        let crumb = crumb.trim();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(Error::external("Could not obtain crumb from Yahoo Finance"));
        }
        Ok(crumb.to_string())
    }

    fn extract_crumb(html: &str) -> Option<String> {
        // Look for pattern like "crumb":"XXXXX" in the HTML/JS
        let start = html.find("\"crumb\":\"")? + 9;
        let end = html[start..].find('"')?;
        let crumb = &html[start..start + end];
        (!crumb.is_empty()).then(|| crumb.to_string())
    }

    async fn crumb(&self) -> Result<String> {
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }
        let crumb = self.fetch_crumb().await?;
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    async fn send_quote(&self, symbol: &Symbol, crumb: &str) -> Result<reqwest::Response> {
        self.http
            .get(
                &self.config.quote_url,
                &[("symbols", symbol.as_str()), ("crumb", crumb)],
            )
            .await
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Option<StockInfo>> {
        let crumb = self.crumb().await?;
        let mut response = self.send_quote(symbol, &crumb).await?;

        if needs_crumb_refresh(response.status()) {
            debug!(%symbol, "quote rejected, refreshing crumb");
            *self.crumb.lock().await = None;
            let crumb = self.crumb().await?;
            response = self.send_quote(symbol, &crumb).await?;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(status_error("Quote", status));
        }

        let body = response.text().await?;
        let data: YahooResponse = serde_json::from_str(&body)?;
        parse_quote(symbol, data)
    }

    async fn fetch_chart(&self, request: &ChartRequest) -> Result<Chart> {
        let url = format!("{}/{}", self.config.chart_url, request.symbol);

        let mut params: Vec<(&str, String)> =
            vec![("interval", request.interval.as_str().to_string())];
        match request.range {
            HistoryRange::Period(period) => params.push(("range", period.as_str().to_string())),
            HistoryRange::Between { start, end } => {
                params.push(("period1", unix_midnight(start).to_string()));
                params.push(("period2", unix_midnight(end).to_string()));
            }
        }
        if request.events {
            params.push(("events", "div,split".to_string()));
        }
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response = self.http.get(&url, &params).await?;
        let status = response.status();
        let body = response.text().await?;
        if let Some(err) = chart_status_error(&request.symbol, status, &body) {
            return Err(err);
        }

        let data: ChartResponse = serde_json::from_str(&body)?;
        parse_chart(&request.symbol, data)
    }

    async fn fetch_news(&self, symbol: &Symbol, count: usize) -> Result<Vec<NewsArticle>> {
        let count = count.to_string();
        let response = self
            .http
            .get(
                &self.config.search_url,
                &[
                    ("q", symbol.as_str()),
                    ("newsCount", count.as_str()),
                    ("quotesCount", "0"),
                ],
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error("News", status));
        }

        let body = response.text().await?;
        let data: SearchResponse = serde_json::from_str(&body)?;
        Ok(parse_news(data))
    }
}

impl MarketDataProvider for YahooClient {
    fn quote<'a>(&'a self, symbol: &'a Symbol) -> ProviderFuture<'a, Option<StockInfo>> {
        Box::pin(self.fetch_quote(symbol))
    }

    fn chart<'a>(&'a self, request: &'a ChartRequest) -> ProviderFuture<'a, Chart> {
        Box::pin(self.fetch_chart(request))
    }
}

impl NewsProvider for YahooClient {
    fn name(&self) -> &str {
        "yfinance"
    }

    fn news<'a>(
        &'a self,
        symbol: &'a Symbol,
        count: usize,
    ) -> ProviderFuture<'a, Vec<NewsArticle>> {
        Box::pin(self.fetch_news(symbol, count))
    }
}

fn status_error(api: &str, status: StatusCode) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Error::external(format!("{} API rate limited: {}", api, status))
    } else {
        Error::external(format!("{} API error: {}", api, status))
    }
}

/// Quote requests rejected for a stale crumb are retried once with a fresh one.
fn needs_crumb_refresh(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
}

/// A 404 names an unknown symbol; other failures are upstream errors.
fn chart_status_error(symbol: &Symbol, status: StatusCode, body: &str) -> Option<Error> {
    if status == StatusCode::NOT_FOUND {
        let description = serde_json::from_str::<ChartResponse>(body)
            .ok()
            .and_then(|r| r.chart.error)
            .and_then(|e| e.description);
        return Some(Error::lookup(description.unwrap_or_else(|| {
            format!("No data found for symbol {}", symbol)
        })));
    }
    (!status.is_success()).then(|| status_error("Chart", status))
}

/// Crumb embedded in the landing page. An unreadable page falls through to
/// the getcrumb endpoint.
fn crumb_from_page<E: Display>(page: std::result::Result<String, E>) -> Option<String> {
    match page {
        Ok(html) => YahooClient::extract_crumb(&html),
        Err(e) => {
            debug!(error = %e, "could not read landing page");
            None
        }
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

fn parse_quote(symbol: &Symbol, data: YahooResponse) -> Result<Option<StockInfo>> {
    if let Some(err) = data.quote_response.error.filter(|e| !e.is_null()) {
        return Err(Error::external(format!("Yahoo API error: {}", err)));
    }

    let mut results = data.quote_response.result;
    let matching = results.iter().position(|fields| {
        fields
            .get("symbol")
            .and_then(|s| s.as_str())
            .is_some_and(|s| s.eq_ignore_ascii_case(symbol.as_str()))
    });

    let fields = match matching {
        Some(index) => results.swap_remove(index),
        None => return Ok(None),
    };

    Ok(Some(StockInfo {
        symbol: symbol.clone(),
        fields: fields.into_iter().collect(),
    }))
}

fn parse_chart(symbol: &Symbol, data: ChartResponse) -> Result<Chart> {
    if let Some(err) = data.chart.error {
        let description = err
            .description
            .unwrap_or_else(|| format!("chart request failed for {}", symbol));
        return Err(match err.code.as_deref() {
            Some("Not Found") => Error::lookup(description),
            _ => Error::external(description),
        });
    }

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Chart::default());
    };

    let utc_offset = result
        .meta
        .as_ref()
        .and_then(|m| m.gmt_offset)
        .and_then(FixedOffset::east_opt);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next();
    let column = |values: Option<Vec<Option<f64>>>| values.unwrap_or_default();
    let (open, high, low, close, volume) = match quote {
        Some(q) => (
            column(q.open),
            column(q.high),
            column(q.low),
            column(q.close),
            column(q.volume),
        ),
        None => Default::default(),
    };

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    // Rows without a close are gaps in the upstream data and are skipped.
    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = at(&close, i)?;
            Some(Bar {
                timestamp: from_unix(ts)?,
                open: at(&open, i).unwrap_or(close),
                high: at(&high, i).unwrap_or(close),
                low: at(&low, i).unwrap_or(close),
                close,
                volume: at(&volume, i).map(|v| v.max(0.0) as u64).unwrap_or(0),
            })
        })
        .collect();

    let events = result.events;
    let dividends = events
        .as_ref()
        .and_then(|e| e.dividends.as_ref())
        .map(|divs| {
            divs.values()
                .filter_map(|d| {
                    Some(Dividend {
                        timestamp: from_unix(d.date)?,
                        amount: d.amount,
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let splits = events
        .as_ref()
        .and_then(|e| e.splits.as_ref())
        .map(|splits| {
            splits
                .values()
                .filter_map(|s| {
                    Some(Split {
                        timestamp: from_unix(s.date)?,
                        numerator: s.numerator,
                        denominator: s.denominator,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Chart {
        bars,
        dividends,
        splits,
        utc_offset,
    })
}

fn parse_news(data: SearchResponse) -> Vec<NewsArticle> {
    data.news
        .unwrap_or_default()
        .into_iter()
        .filter_map(|n| {
            let content = n.content.unwrap_or_default();
            let summary = [n.summary, content.summary, content.description]
                .into_iter()
                .flatten()
                .find(|s| !s.trim().is_empty());
            Some(NewsArticle {
                title: n.title?,
                publisher: n.publisher.unwrap_or_else(|| "Unknown".to_string()),
                published_at: n.provider_publish_time.and_then(from_unix),
                link: n.link.unwrap_or_default(),
                summary,
                thumbnail: n
                    .thumbnail
                    .and_then(|t| t.resolutions.into_iter().next())
                    .and_then(|r| r.url),
                content_type: n.content_type.unwrap_or_else(|| "STORY".to_string()),
                sentiment: None,
            })
        })
        .collect()
}
