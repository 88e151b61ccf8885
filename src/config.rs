use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::{Interval, Period};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YahooConfig {
    #[serde(default = "default_yahoo_base_url")]
    pub base_url: String,
    #[serde(default = "default_yahoo_crumb_url")]
    pub crumb_url: String,
    #[serde(default = "default_yahoo_quote_url")]
    pub quote_url: String,
    #[serde(default = "default_yahoo_chart_url")]
    pub chart_url: String,
    #[serde(default = "default_yahoo_search_url")]
    pub search_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_yahoo_base_url() -> String {
    "https://finance.yahoo.com".to_string()
}

fn default_yahoo_crumb_url() -> String {
    "https://query1.finance.yahoo.com/v1/test/getcrumb".to_string()
}

fn default_yahoo_quote_url() -> String {
    "https://query1.finance.yahoo.com/v7/finance/quote".to_string()
}

fn default_yahoo_chart_url() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".to_string()
}

fn default_yahoo_search_url() -> String {
    "https://query2.finance.yahoo.com/v1/finance/search".to_string()
}

fn default_user_agent() -> String {
    crate::api::http::DEFAULT_USER_AGENT.to_string()
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: default_yahoo_base_url(),
            crumb_url: default_yahoo_crumb_url(),
            quote_url: default_yahoo_quote_url(),
            chart_url: default_yahoo_chart_url(),
            search_url: default_yahoo_search_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipRanksConfig {
    #[serde(default = "default_tipranks_base_url")]
    pub base_url: String,
}

fn default_tipranks_base_url() -> String {
    "https://www.tipranks.com".to_string()
}

impl Default for TipRanksConfig {
    fn default() -> Self {
        Self {
            base_url: default_tipranks_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_limit")]
    pub default_limit: usize,
    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,
    /// How many articles keyword search pulls before filtering.
    #[serde(default = "default_search_depth")]
    pub search_depth: usize,
}

fn default_news_limit() -> usize {
    10
}

fn default_summary_limit() -> usize {
    5
}

fn default_search_depth() -> usize {
    50
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            default_limit: default_news_limit(),
            summary_limit: default_summary_limit(),
            search_depth: default_search_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub yahoo: YahooConfig,
    #[serde(default)]
    pub tipranks: TipRanksConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default = "default_period")]
    pub default_period: Period,
    #[serde(default = "default_interval")]
    pub default_interval: Interval,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_period() -> Period {
    Period::OneYear
}

fn default_interval() -> Interval {
    Interval::OneDay
}

impl Default for Config {
    fn default() -> Self {
        Self {
            yahoo: YahooConfig::default(),
            tipranks: TipRanksConfig::default(),
            timeout_secs: default_timeout_secs(),
            news: NewsConfig::default(),
            default_period: default_period(),
            default_interval: default_interval(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("finwrap");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        Ok(config_dir.join("config.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    /// Parses a config document and repairs out-of-range values.
    pub fn from_json(content: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn normalize(&mut self) {
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        if self.news.default_limit == 0 {
            self.news.default_limit = default_news_limit();
        }
        if self.news.summary_limit == 0 {
            self.news.summary_limit = default_summary_limit();
        }
        if self.news.search_depth == 0 {
            self.news.search_depth = default_search_depth();
        }
    }
}
