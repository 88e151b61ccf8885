use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use finwrap::format::{
    format_compact, format_date, format_percent, format_price, format_timestamp, format_volume,
};
use finwrap::news::unified::render_unified_summary;
use finwrap::{
    Config, Granularity, HistoryQuery, Interval, MarketDataClient, NewsClient, NewsProvider,
    Period, PriceSeries, Symbol, TipRanksClient, UnifiedNewsClient, YahooClient,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "finwrap")]
#[command(about = "Stock quotes, price analytics and news from Yahoo Finance and TipRanks", long_about = None)]
struct Cli {
    /// Log outbound requests
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct RangeArgs {
    /// Look-back period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)
    #[arg(short, long)]
    period: Option<Period>,

    /// Start date (YYYY-MM-DD), requires --end
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), requires --start
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Bar interval (1m, 2m, 5m, 15m, 30m, 60m, 90m, 1h, 1d, 5d, 1wk, 1mo, 3mo)
    #[arg(short, long)]
    interval: Option<Interval>,
}

impl RangeArgs {
    fn to_query(&self, config: &Config) -> HistoryQuery {
        let period = match (self.period, self.start, self.end) {
            (None, None, None) => Some(config.default_period),
            (period, _, _) => period,
        };
        HistoryQuery {
            period,
            start: self.start,
            end: self.end,
            interval: self.interval.unwrap_or(config.default_interval),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Company metadata
    Info { symbol: Symbol },
    /// Latest trade price
    Price { symbol: Symbol },
    /// OHLCV history
    History {
        symbol: Symbol,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// History for several symbols
    Batch {
        #[arg(required = true)]
        symbols: Vec<Symbol>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Period-over-period returns
    Returns {
        symbol: Symbol,
        /// daily, weekly or monthly
        #[arg(short, long, default_value = "daily")]
        granularity: Granularity,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Simple moving averages of the close
    Ma {
        symbol: Symbol,
        #[arg(short, long, value_delimiter = ',', default_value = "20,50,200")]
        windows: Vec<usize>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Annualized rolling volatility of daily returns
    Volatility {
        symbol: Symbol,
        #[arg(short, long, default_value = "30")]
        window: usize,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Dividend history
    Dividends { symbol: Symbol },
    /// Split history
    Splits { symbol: Symbol },
    /// Recent articles
    News {
        symbol: Symbol,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Recent headlines
    Headlines {
        symbol: Symbol,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Formatted news digest
    NewsSummary {
        symbol: Symbol,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Articles mentioning a keyword
    SearchNews {
        symbol: Symbol,
        keyword: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// News merged from Yahoo and TipRanks
    UnifiedNews {
        symbol: Symbol,
        /// Articles per source
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only this source (yfinance or tipranks)
        #[arg(short, long)]
        source: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let yahoo = Arc::new(YahooClient::new(config.yahoo.clone(), config.timeout())?);
    let market = MarketDataClient::new(Arc::clone(&yahoo));
    let news = NewsClient::new(Arc::clone(&yahoo)).with_search_depth(config.news.search_depth);
    let json = cli.json;

    match cli.command {
        Command::Info { symbol } => {
            let info = market.get_stock_info(&symbol).await?;
            if json {
                return print_json(&info);
            }
            println!("{}", info.long_name().or(info.short_name()).unwrap_or("N/A"));
            if let Some(price) = info.regular_market_price() {
                println!("  Price:      {} {}", format_price(price), info.currency().unwrap_or(""));
            }
            if let Some(cap) = info.market_cap() {
                println!("  Market cap: {}", format_compact(cap));
            }
            for (key, value) in &info.fields {
                println!("  {}: {}", key, value);
            }
        }
        Command::Price { symbol } => {
            let price = market.get_current_price(&symbol).await?;
            if json {
                return print_json(&price);
            }
            println!("{}: {}", symbol, format_price(price));
        }
        Command::History { symbol, range } => {
            let series = market
                .get_historical_data(&symbol, &range.to_query(&config))
                .await?;
            if json {
                return print_json(&series);
            }
            print_series(&series);
        }
        Command::Batch { symbols, range } => {
            let results = market
                .get_multiple_stocks(&symbols, &range.to_query(&config))
                .await?;
            if json {
                return print_json(&results);
            }
            for (symbol, series) in &results {
                match series.last() {
                    Some(bar) => println!(
                        "{:<10} {:>4} bars  last {}  close {}",
                        symbol,
                        series.len(),
                        format_date(&bar.timestamp),
                        format_price(bar.close)
                    ),
                    None => println!("{:<10} no data", symbol),
                }
            }
        }
        Command::Returns {
            symbol,
            granularity,
            range,
        } => {
            let series = market
                .get_historical_data(&symbol, &range.to_query(&config))
                .await?;
            let returns = market.calculate_returns(&series, granularity);
            if json {
                return print_json(&returns);
            }
            for point in &returns.points {
                println!("{}  {:>9}", format_date(&point.timestamp), format_percent(point.value));
            }
        }
        Command::Ma {
            symbol,
            windows,
            range,
        } => {
            let series = market
                .get_historical_data(&symbol, &range.to_query(&config))
                .await?;
            let averages = market.get_moving_averages(&series, &windows)?;
            if json {
                return print_json(&averages);
            }
            let header: Vec<String> = averages.windows().iter().map(|w| format!("MA_{}", w)).collect();
            println!("{:<10}  {:>12}  {}", "Date", "Close", header.join("  "));
            for (row, bar) in averages.series.bars().iter().enumerate() {
                let cells: Vec<String> = averages
                    .columns
                    .values()
                    .map(|col| col[row].map(format_price).unwrap_or_else(|| "-".to_string()))
                    .collect();
                println!(
                    "{:<10}  {:>12}  {}",
                    format_date(&bar.timestamp),
                    format_price(bar.close),
                    cells.join("  ")
                );
            }
        }
        Command::Volatility {
            symbol,
            window,
            range,
        } => {
            let series = market
                .get_historical_data(&symbol, &range.to_query(&config))
                .await?;
            let vol = market.get_volatility(&series, window)?;
            if json {
                return print_json(&vol);
            }
            for point in &vol.points {
                let value = point
                    .value
                    .map(|v| format!("{:.2}%", v * 100.0))
                    .unwrap_or_else(|| "-".to_string());
                println!("{}  {:>8}", format_date(&point.timestamp), value);
            }
        }
        Command::Dividends { symbol } => {
            let dividends = market.get_dividends(&symbol).await?;
            if json {
                return print_json(&dividends);
            }
            if dividends.is_empty() {
                println!("No dividends recorded for {}", symbol);
            }
            for d in &dividends {
                println!("{}  {:.4}", format_date(&d.timestamp), d.amount);
            }
        }
        Command::Splits { symbol } => {
            let splits = market.get_splits(&symbol).await?;
            if json {
                return print_json(&splits);
            }
            if splits.is_empty() {
                println!("No splits recorded for {}", symbol);
            }
            for s in &splits {
                println!("{}  {}:{}", format_date(&s.timestamp), s.numerator, s.denominator);
            }
        }
        Command::News { symbol, limit } => {
            let limit = limit.unwrap_or(config.news.default_limit);
            let articles = news.get_news(&symbol, limit).await?;
            if json {
                return print_json(&articles);
            }
            for a in &articles {
                let when = a.published_at.as_ref().map(format_timestamp).unwrap_or_default();
                println!("{}  [{}] {}", when, a.publisher, a.title);
                if !a.link.is_empty() {
                    println!("    {}", a.link);
                }
            }
        }
        Command::Headlines { symbol, limit } => {
            let limit = limit.unwrap_or(config.news.default_limit);
            let headlines = news.get_news_headlines(&symbol, limit).await?;
            if json {
                return print_json(&headlines);
            }
            for title in &headlines {
                println!("- {}", title);
            }
        }
        Command::NewsSummary { symbol, limit } => {
            let limit = limit.unwrap_or(config.news.summary_limit);
            println!("{}", news.get_news_summary(&symbol, limit).await?);
        }
        Command::SearchNews {
            symbol,
            keyword,
            limit,
        } => {
            let limit = limit.unwrap_or(config.news.default_limit);
            let articles = news.search_news_by_keyword(&symbol, &keyword, limit).await?;
            if json {
                return print_json(&articles);
            }
            if articles.is_empty() {
                println!("No articles for {} mention '{}'", symbol, keyword);
            }
            for a in &articles {
                println!("- {} ({})", a.title, a.publisher);
            }
        }
        Command::UnifiedNews {
            symbol,
            limit,
            source,
        } => {
            let tipranks = TipRanksClient::new(&config.tipranks, config.timeout())?;
            let sources: Vec<Box<dyn NewsProvider>> =
                vec![Box::new(Arc::clone(&yahoo)), Box::new(tipranks)];
            let unified = UnifiedNewsClient::new(sources);
            let limit = limit.or(Some(config.news.summary_limit));

            match source {
                Some(source) => {
                    let articles = unified.get_news_by_source(&symbol, &source, limit).await?;
                    if json {
                        return print_json(&articles);
                    }
                    for a in &articles {
                        println!("- [{}] {} ({})", a.source.to_uppercase(), a.title, a.publisher);
                    }
                }
                None => {
                    let merged = unified.get_unified_news(&symbol, limit).await?;
                    if json {
                        return print_json(&merged);
                    }
                    println!("{}", render_unified_summary(&merged));
                }
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_series(series: &PriceSeries) {
    println!(
        "{:<19}  {:>12}  {:>12}  {:>12}  {:>12}  {:>9}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    for bar in series.bars() {
        println!(
            "{:<19}  {:>12}  {:>12}  {:>12}  {:>12}  {:>9}",
            format_timestamp(&bar.timestamp),
            format_price(bar.open),
            format_price(bar.high),
            format_price(bar.low),
            format_price(bar.close),
            format_volume(bar.volume)
        );
    }
}
