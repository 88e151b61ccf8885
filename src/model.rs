use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A ticker symbol, trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Result<Self> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(Error::config("symbol must be a non-empty string"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Symbol::new(s)
    }
}

/// Bar granularities accepted by the chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "90m")]
    NinetyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::OneMinute,
        Interval::TwoMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
        Interval::NinetyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::FiveDays,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::ThreeMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::TwoMinutes => "2m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::NinetyMinutes => "90m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Interval::ALL.iter().map(|i| i.as_str()).collect();
                Error::config(format!(
                    "invalid interval '{}', expected one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// Look-back ranges accepted by the chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Period::ALL.iter().map(|p| p.as_str()).collect();
                Error::config(format!(
                    "invalid period '{}', expected one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// Caller-facing history parameters. Exactly one of `period` or the
/// `start`/`end` pair must be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub period: Option<Period>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub interval: Interval,
}

/// A validated history range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    Period(Period),
    Between { start: NaiveDate, end: NaiveDate },
}

impl HistoryQuery {
    pub fn period(period: Period) -> Self {
        Self {
            period: Some(period),
            start: None,
            end: None,
            interval: Interval::OneDay,
        }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            period: None,
            start: Some(start),
            end: Some(end),
            interval: Interval::OneDay,
        }
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn validate(&self) -> Result<HistoryRange> {
        match (self.period, self.start, self.end) {
            (Some(period), None, None) => Ok(HistoryRange::Period(period)),
            (None, Some(start), Some(end)) => {
                if start >= end {
                    return Err(Error::config(format!(
                        "start date {} must be before end date {}",
                        start, end
                    )));
                }
                Ok(HistoryRange::Between { start, end })
            }
            (Some(_), _, _) => Err(Error::config(
                "specify either a period or a start/end range, not both",
            )),
            (None, None, None) => Err(Error::config(
                "either a period or a start/end range is required",
            )),
            (None, _, _) => Err(Error::config(
                "a date range needs both a start and an end date",
            )),
        }
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self::period(Period::OneYear)
    }
}

/// Resampling bucket used before computing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            other => Err(Error::config(format!(
                "granularity must be 'daily', 'weekly', or 'monthly', got '{}'",
                other
            ))),
        }
    }
}

/// One OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Chronologically ordered bars for one symbol. Timestamps are strictly
/// ascending.
///
/// `utc_offset` is the exchange's offset from UTC; calendar bucketing happens
/// on exchange-local dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: Symbol,
    bars: Vec<Bar>,
    #[serde(skip)]
    utc_offset: FixedOffset,
}

impl PriceSeries {
    /// Sorts the bars and drops duplicate timestamps, keeping the last record
    /// seen for each.
    pub fn new(symbol: Symbol, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.timestamp == bar.timestamp => *prev = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol,
            bars: deduped,
            utc_offset: Utc.fix(),
        }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dividend {
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Split {
    pub timestamp: DateTime<Utc>,
    pub numerator: f64,
    pub denominator: f64,
}

impl Split {
    /// New shares per old share, e.g. 4.0 for a 4:1 split. `None` when the
    /// denominator is zero.
    pub fn ratio(&self) -> Option<f64> {
        (self.denominator != 0.0).then(|| self.numerator / self.denominator)
    }
}

/// Company metadata as returned by the quote endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockInfo {
    pub symbol: Symbol,
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl StockInfo {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(|v| v.as_f64())
    }

    pub fn short_name(&self) -> Option<&str> {
        self.get_str("shortName")
    }

    pub fn long_name(&self) -> Option<&str> {
        self.get_str("longName")
    }

    pub fn regular_market_price(&self) -> Option<f64> {
        self.get_f64("regularMarketPrice")
    }

    pub fn market_cap(&self) -> Option<f64> {
        self.get_f64("marketCap")
    }

    pub fn currency(&self) -> Option<&str> {
        self.get_str("currency")
    }
}

/// A news article as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub publisher: String,
    pub published_at: Option<DateTime<Utc>>,
    pub link: String,
    pub summary: Option<String>,
    pub thumbnail: Option<String>,
    pub content_type: String,
    /// Only some sources score articles.
    pub sentiment: Option<String>,
}

impl NewsArticle {
    /// Case-insensitive substring match against title and summary.
    pub fn mentions(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .summary
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
    }
}

/// Newest first; undated articles go last.
pub(crate) fn sort_newest_first(articles: &mut [NewsArticle]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}
