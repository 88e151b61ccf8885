mod common;

use common::*;
use finwrap::news::unified::render_unified_summary;
use finwrap::{NewsArticle, NewsProvider, UnifiedNewsClient};
use std::sync::Arc;

const T0: i64 = 1_717_000_000;

fn yahoo_articles() -> Vec<NewsArticle> {
    vec![
        make_article("Yahoo early", "Yahoo Finance", Some(T0 + 10), Some("first")),
        make_article("Yahoo late", "Yahoo Finance", Some(T0 + 40), None),
    ]
}

fn tipranks_articles() -> Vec<NewsArticle> {
    let mut bullish = make_article("TipRanks mid", "TipRanks", Some(T0 + 20), None);
    bullish.sentiment = Some("positive".to_string());
    vec![
        bullish,
        make_article("TipRanks newest", "TipRanks", Some(T0 + 50), None),
        make_article("TipRanks third", "TipRanks", Some(T0 + 30), None),
    ]
}

fn client_with(sources: Vec<Arc<FakeNewsProvider>>) -> UnifiedNewsClient {
    let boxed: Vec<Box<dyn NewsProvider>> = sources
        .into_iter()
        .map(|p| Box::new(p) as Box<dyn NewsProvider>)
        .collect();
    UnifiedNewsClient::new(boxed)
}

#[tokio::test]
async fn merges_all_sources_newest_first() {
    let yahoo = Arc::new(FakeNewsProvider::new("yfinance", yahoo_articles()));
    let tipranks = Arc::new(FakeNewsProvider::new("tipranks", tipranks_articles()));
    let client = client_with(vec![Arc::clone(&yahoo), Arc::clone(&tipranks)]);

    let news = client.get_unified_news(&sym("AAPL"), None).await.unwrap();

    assert_eq!(news.ticker.as_str(), "AAPL");
    assert_eq!(news.sources, vec!["yfinance", "tipranks"]);
    assert_eq!(news.total_articles(), 5);
    let titles: Vec<&str> = news.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["TipRanks newest", "Yahoo late", "TipRanks third", "TipRanks mid", "Yahoo early"]
    );
    assert_eq!(news.report("yfinance").unwrap().count, 2);
    assert_eq!(news.report("TIPRANKS").unwrap().count, 3);
    assert_eq!(yahoo.requested_counts(), vec![100]);
}

#[tokio::test]
async fn articles_are_standardized() {
    let tipranks = Arc::new(FakeNewsProvider::new("tipranks", tipranks_articles()));
    let client = client_with(vec![tipranks]);

    let news = client.get_unified_news(&sym("aapl"), Some(5)).await.unwrap();
    let mid = news.articles.iter().find(|a| a.title == "TipRanks mid").unwrap();
    assert_eq!(mid.sentiment, "positive");
    assert_eq!(mid.source, "tipranks");
    assert_eq!(mid.ticker.as_str(), "AAPL");

    let newest = news.articles.iter().find(|a| a.title == "TipRanks newest").unwrap();
    assert_eq!(newest.sentiment, "neutral");
}

#[tokio::test]
async fn per_source_limit_applies_to_each_source() {
    let yahoo = Arc::new(FakeNewsProvider::new("yfinance", yahoo_articles()));
    let tipranks = Arc::new(FakeNewsProvider::new("tipranks", tipranks_articles()));
    let client = client_with(vec![Arc::clone(&yahoo), Arc::clone(&tipranks)]);

    let news = client.get_unified_news(&sym("AAPL"), Some(1)).await.unwrap();
    assert_eq!(news.total_articles(), 2);
    assert!(news.by_source.iter().all(|r| r.count == 1));
    assert_eq!(tipranks.requested_counts(), vec![1]);
}

#[tokio::test]
async fn failing_source_is_recorded_and_others_still_contribute() {
    let yahoo = Arc::new(FakeNewsProvider::failing("yfinance", "rate limited"));
    let tipranks = Arc::new(FakeNewsProvider::new("tipranks", tipranks_articles()));
    let client = client_with(vec![yahoo, tipranks]);

    let news = client.get_unified_news(&sym("AAPL"), None).await.unwrap();
    assert_eq!(news.total_articles(), 3);

    let failed = news.report("yfinance").unwrap();
    assert_eq!(failed.count, 0);
    assert!(failed.articles.is_empty());
    assert!(failed.error.as_deref().unwrap().contains("rate limited"));
    assert!(news.report("tipranks").unwrap().error.is_none());
}

#[tokio::test]
async fn zero_limit_is_rejected() {
    let yahoo = Arc::new(FakeNewsProvider::new("yfinance", yahoo_articles()));
    let client = client_with(vec![Arc::clone(&yahoo)]);

    let err = client.get_unified_news(&sym("AAPL"), Some(0)).await.unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(yahoo.call_count(), 0);
}

#[tokio::test]
async fn news_by_source_queries_only_that_source() {
    let yahoo = Arc::new(FakeNewsProvider::new("yfinance", yahoo_articles()));
    let tipranks = Arc::new(FakeNewsProvider::new("tipranks", tipranks_articles()));
    let client = client_with(vec![Arc::clone(&yahoo), Arc::clone(&tipranks)]);

    let articles = client
        .get_news_by_source(&sym("AAPL"), "TipRanks", Some(2))
        .await
        .unwrap();
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.source == "tipranks"));
    assert_eq!(yahoo.call_count(), 0);
}

#[tokio::test]
async fn unknown_source_lists_the_available_ones() {
    let yahoo = Arc::new(FakeNewsProvider::new("yfinance", yahoo_articles()));
    let tipranks = Arc::new(FakeNewsProvider::new("tipranks", tipranks_articles()));
    let client = client_with(vec![yahoo, tipranks]);

    let err = client
        .get_news_by_source(&sym("AAPL"), "reddit", None)
        .await
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("Unknown source: reddit"));
    assert!(err.to_string().contains("yfinance, tipranks"));
}

#[tokio::test]
async fn news_by_source_propagates_failures() {
    let client = client_with(vec![Arc::new(FakeNewsProvider::failing("yfinance", "HTTP 502"))]);
    let err = client
        .get_news_by_source(&sym("AAPL"), "yfinance", None)
        .await
        .unwrap_err();
    assert!(!err.is_configuration());
    assert!(!err.is_lookup());
}

#[tokio::test]
async fn summary_reports_sources_and_articles() {
    let yahoo = Arc::new(FakeNewsProvider::failing("yfinance", "rate limited"));
    let tipranks = Arc::new(FakeNewsProvider::new("tipranks", tipranks_articles()));
    let client = client_with(vec![yahoo, tipranks]);

    let summary = client.get_news_summary(&sym("AAPL"), None).await.unwrap();

    assert!(summary.starts_with("Unified News Summary for AAPL\n"));
    assert!(summary.contains("Total Articles: 3\n"));
    assert!(summary.contains("Sources: yfinance, tipranks\n"));
    assert!(summary.contains("YFINANCE: 0 articles (Error: "));
    assert!(summary.contains("TIPRANKS: 3 articles\n"));
    assert!(summary.contains("1. [TIPRANKS] TipRanks newest\n"));
    assert!(summary.contains("   Sentiment: positive\n"));
    assert_eq!(summary.matches("Sentiment:").count(), 1);
}

#[tokio::test]
async fn summary_caps_listed_articles_and_text() {
    let long = "y".repeat(400);
    let many: Vec<NewsArticle> = (0..15)
        .map(|i| make_article(&format!("Story {}", i), "Wire", Some(T0 + i), Some(long.as_str())))
        .collect();
    let client = client_with(vec![Arc::new(FakeNewsProvider::new("yfinance", many))]);

    let news = client.get_unified_news(&sym("AAPL"), None).await.unwrap();
    let summary = render_unified_summary(&news);

    assert!(summary.contains("Total Articles: 15"));
    assert!(summary.contains("10. [YFINANCE] Story 5\n"));
    assert!(!summary.contains("11. "));
    let expected_line = format!("   Summary: {}...", "y".repeat(150));
    assert!(summary.lines().any(|l| l == expected_line));
}
