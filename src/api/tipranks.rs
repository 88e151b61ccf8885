use crate::api::http::HttpClient;
use crate::config::TipRanksConfig;
use crate::error::Result;
use crate::model::{NewsArticle, Symbol};
use crate::provider::{NewsProvider, ProviderFuture};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const GET_NEWS_ENDPOINT: &str = "api/stocks/getNews";

/// One article as TipRanks returns it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipRanksArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_string: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl TipRanksArticle {
    fn into_article(self) -> Option<NewsArticle> {
        Some(NewsArticle {
            title: self.title?,
            publisher: self.site_name.unwrap_or_else(|| "Unknown".to_string()),
            published_at: self.date.as_deref().and_then(parse_date),
            link: self.url.or(self.url_string).unwrap_or_default(),
            summary: None,
            thumbnail: None,
            content_type: "article".to_string(),
            sentiment: self.sentiment,
        })
    }
}

/// TipRanks news feed client.
pub struct TipRanksClient {
    http: HttpClient,
}

impl TipRanksClient {
    pub fn new(config: &TipRanksConfig, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder(config.base_url.clone())
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    /// Raw articles for a ticker, in the order TipRanks returns them.
    pub async fn get_news(&self, symbol: &Symbol) -> Result<Vec<TipRanksArticle>> {
        let body: serde_json::Value = self
            .http
            .get_json(GET_NEWS_ENDPOINT, &[("ticker", symbol.as_str())])
            .await?;
        Ok(extract_articles(body))
    }

    async fn fetch_news(&self, symbol: &Symbol, count: usize) -> Result<Vec<NewsArticle>> {
        let articles = self.get_news(symbol).await?;
        Ok(articles
            .into_iter()
            .filter_map(TipRanksArticle::into_article)
            .take(count)
            .collect())
    }
}

impl NewsProvider for TipRanksClient {
    fn name(&self) -> &str {
        "tipranks"
    }

    fn news<'a>(
        &'a self,
        symbol: &'a Symbol,
        count: usize,
    ) -> ProviderFuture<'a, Vec<NewsArticle>> {
        Box::pin(self.fetch_news(symbol, count))
    }
}

/// The endpoint answers with either a bare list or an object wrapping the
/// list under `news` or `data`.
fn extract_articles(body: serde_json::Value) -> Vec<TipRanksArticle> {
    let list = match body {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => {
            let news = map.remove("news");
            match news {
                Some(serde_json::Value::Array(items)) if !items.is_empty() => items,
                _ => match map.remove("data") {
                    Some(serde_json::Value::Array(items)) => items,
                    _ => Vec::new(),
                },
            }
        }
        _ => Vec::new(),
    };

    list.into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
