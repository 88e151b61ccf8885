//! Aggregation across several news sources.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::format::{format_timestamp, truncate_str};
use crate::model::{NewsArticle, Symbol};
use crate::provider::NewsProvider;

/// Articles requested per source when the caller sets no limit.
pub const UNBOUNDED_FETCH: usize = 100;
pub const UNIFIED_SUMMARY_ARTICLES: usize = 10;
pub const UNIFIED_SUMMARY_TEXT_LIMIT: usize = 150;
const NEUTRAL: &str = "neutral";

/// An article tagged with the source it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardArticle {
    pub title: String,
    pub summary: Option<String>,
    pub url: String,
    pub publisher: String,
    pub published_at: Option<DateTime<Utc>>,
    pub sentiment: String,
    pub source: String,
    pub ticker: Symbol,
    pub thumbnail: Option<String>,
    pub content_type: String,
}

impl StandardArticle {
    pub fn from_article(article: NewsArticle, source: &str, ticker: &Symbol) -> Self {
        Self {
            title: article.title,
            summary: article.summary,
            url: article.link,
            publisher: article.publisher,
            published_at: article.published_at,
            sentiment: article
                .sentiment
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NEUTRAL.to_string()),
            source: source.to_string(),
            ticker: ticker.clone(),
            thumbnail: article.thumbnail,
            content_type: article.content_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub count: usize,
    pub articles: Vec<StandardArticle>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedNews {
    pub ticker: Symbol,
    pub sources: Vec<String>,
    /// All sources merged, newest first.
    pub articles: Vec<StandardArticle>,
    pub by_source: Vec<SourceReport>,
    pub generated_at: DateTime<Utc>,
}

impl UnifiedNews {
    pub fn total_articles(&self) -> usize {
        self.articles.len()
    }

    pub fn report(&self, source: &str) -> Option<&SourceReport> {
        self.by_source
            .iter()
            .find(|r| r.source.eq_ignore_ascii_case(source))
    }
}

pub struct UnifiedNewsClient {
    providers: Vec<Box<dyn NewsProvider>>,
}

impl UnifiedNewsClient {
    pub fn new(providers: Vec<Box<dyn NewsProvider>>) -> Self {
        Self { providers }
    }

    pub fn with_source(mut self, provider: Box<dyn NewsProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Queries every source in turn. A failing source is recorded in its
    /// report and the others still contribute.
    pub async fn get_unified_news(
        &self,
        symbol: &Symbol,
        limit_per_source: Option<usize>,
    ) -> Result<UnifiedNews> {
        let count = fetch_count(limit_per_source)?;

        let mut by_source = Vec::with_capacity(self.providers.len());
        let mut articles = Vec::new();

        for provider in &self.providers {
            let name = provider.name().to_string();
            let report = match provider.news(symbol, count).await {
                Ok(raw) => {
                    let standardized: Vec<StandardArticle> = raw
                        .into_iter()
                        .take(count)
                        .map(|a| StandardArticle::from_article(a, &name, symbol))
                        .collect();
                    articles.extend(standardized.iter().cloned());
                    SourceReport {
                        source: name,
                        count: standardized.len(),
                        articles: standardized,
                        error: None,
                    }
                }
                Err(e) => {
                    warn!(%symbol, source = %name, error = %e, "news source failed");
                    SourceReport {
                        source: name,
                        count: 0,
                        articles: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            by_source.push(report);
        }

        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Ok(UnifiedNews {
            ticker: symbol.clone(),
            sources: self.source_names(),
            articles,
            by_source,
            generated_at: Utc::now(),
        })
    }

    /// Standardized articles from one named source.
    pub async fn get_news_by_source(
        &self,
        symbol: &Symbol,
        source: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StandardArticle>> {
        let count = fetch_count(limit)?;
        let provider = self
            .providers
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(source))
            .ok_or_else(|| {
                Error::config(format!(
                    "Unknown source: {}. Available sources: {}",
                    source,
                    self.source_names().join(", ")
                ))
            })?;

        let name = provider.name().to_string();
        let articles = provider.news(symbol, count).await?;
        Ok(articles
            .into_iter()
            .take(count)
            .map(|a| StandardArticle::from_article(a, &name, symbol))
            .collect())
    }

    pub async fn get_news_summary(
        &self,
        symbol: &Symbol,
        limit_per_source: Option<usize>,
    ) -> Result<String> {
        let news = self.get_unified_news(symbol, limit_per_source).await?;
        Ok(render_unified_summary(&news))
    }
}

fn fetch_count(limit: Option<usize>) -> Result<usize> {
    match limit {
        Some(0) => Err(Error::config("news limit must be greater than zero")),
        Some(n) => Ok(n),
        None => Ok(UNBOUNDED_FETCH),
    }
}

pub fn render_unified_summary(news: &UnifiedNews) -> String {
    let rule = "=".repeat(50);
    let mut out = format!("Unified News Summary for {}\n{}\n\n", news.ticker, rule);

    let _ = writeln!(out, "Total Articles: {}", news.total_articles());
    let _ = writeln!(out, "Sources: {}", news.sources.join(", "));
    let _ = writeln!(
        out,
        "Generated: {}\n",
        news.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    for report in &news.by_source {
        let _ = write!(out, "{}: {} articles", report.source.to_uppercase(), report.count);
        if let Some(err) = &report.error {
            let _ = write!(out, " (Error: {})", err);
        }
        out.push('\n');
    }

    let _ = write!(out, "\n{}\n\n", rule);

    for (i, article) in news
        .articles
        .iter()
        .take(UNIFIED_SUMMARY_ARTICLES)
        .enumerate()
    {
        let _ = writeln!(
            out,
            "{}. [{}] {}",
            i + 1,
            article.source.to_uppercase(),
            article.title
        );
        let _ = writeln!(out, "   Publisher: {}", article.publisher);
        if let Some(published) = &article.published_at {
            let _ = writeln!(out, "   Date: {}", format_timestamp(published));
        }
        if article.sentiment != NEUTRAL {
            let _ = writeln!(out, "   Sentiment: {}", article.sentiment);
        }
        if let Some(summary) = article.summary.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(
                out,
                "   Summary: {}",
                truncate_str(summary, UNIFIED_SUMMARY_TEXT_LIMIT)
            );
        }
        out.push('\n');
    }

    out
}
