//! News façade over a single [`NewsProvider`].

pub mod unified;

pub use unified::{SourceReport, StandardArticle, UnifiedNews, UnifiedNewsClient};

use std::fmt::Write as _;

use tracing::debug;

use crate::error::{Error, Result};
use crate::format::{format_timestamp, truncate_str};
use crate::model::{sort_newest_first, NewsArticle, Symbol};
use crate::provider::NewsProvider;

pub const SUMMARY_TEXT_LIMIT: usize = 200;
pub const DEFAULT_SEARCH_DEPTH: usize = 50;
const RULE_WIDTH: usize = 50;

pub struct NewsClient<P> {
    provider: P,
    search_depth: usize,
}

impl<P: NewsProvider> NewsClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            search_depth: DEFAULT_SEARCH_DEPTH,
        }
    }

    /// Number of articles keyword search pulls before filtering.
    pub fn with_search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth.max(1);
        self
    }

    /// Up to `limit` articles, most recent first.
    pub async fn get_news(&self, symbol: &Symbol, limit: usize) -> Result<Vec<NewsArticle>> {
        check_limit(limit)?;
        debug!(%symbol, limit, source = self.provider.name(), "fetching news");

        let mut articles = self.provider.news(symbol, limit).await?;
        sort_newest_first(&mut articles);
        articles.truncate(limit);
        Ok(articles)
    }

    pub async fn get_news_headlines(&self, symbol: &Symbol, limit: usize) -> Result<Vec<String>> {
        let articles = self.get_news(symbol, limit).await?;
        Ok(articles.into_iter().map(|a| a.title).collect())
    }

    pub async fn get_news_summary(&self, symbol: &Symbol, limit: usize) -> Result<String> {
        let articles = self.get_news(symbol, limit).await?;
        Ok(render_summary(symbol, &articles))
    }

    /// Articles whose title or summary contains `keyword`, ignoring case.
    pub async fn search_news_by_keyword(
        &self,
        symbol: &Symbol,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>> {
        check_limit(limit)?;
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(Error::config("search keyword must not be empty"));
        }

        let articles = self
            .get_news(symbol, limit.max(self.search_depth))
            .await?;
        Ok(articles
            .into_iter()
            .filter(|a| a.mentions(keyword))
            .take(limit)
            .collect())
    }
}

fn check_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::config("news limit must be greater than zero"));
    }
    Ok(())
}

/// Human-readable listing; an empty list renders a placeholder line.
pub fn render_summary(symbol: &Symbol, articles: &[NewsArticle]) -> String {
    if articles.is_empty() {
        return format!("No recent news found for {}", symbol);
    }

    let mut out = format!("Recent News for {}:\n", symbol);
    out.push_str(&"=".repeat(RULE_WIDTH));
    out.push_str("\n\n");

    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, article.title);
        let _ = writeln!(out, "   Publisher: {}", article.publisher);
        if let Some(published) = &article.published_at {
            let _ = writeln!(out, "   Date: {}", format_timestamp(published));
        }
        if let Some(summary) = article.summary.as_deref().filter(|s| !s.is_empty()) {
            let _ = writeln!(out, "   Summary: {}", truncate_str(summary, SUMMARY_TEXT_LIMIT));
        }
        if !article.link.is_empty() {
            let _ = writeln!(out, "   Link: {}", article.link);
        }
        out.push('\n');
    }

    out
}
