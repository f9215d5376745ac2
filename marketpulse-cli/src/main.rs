//! MarketPulse CLI: market snapshot, per-asset tables, news and keywords.
//!
//! Commands:
//! - `snapshot`: status, summaries and latest indicator values for every configured asset
//! - `asset`: full bar and indicator table for one asset, as JSON
//! - `news`: gather configured news sources, optionally with an AI summary
//! - `keywords`: keyword counts in current news, optionally with the synthetic look-back

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use marketpulse_core::config::{DashboardConfig, Timeframe};
use marketpulse_core::dashboard::{AssetReport, AssetStatus, AssetView, Dashboard};
use marketpulse_core::data::{
    CircuitBreaker, CoinGeckoProvider, CryptoProvider, CsvEquityProvider, EquityProvider,
    YahooProvider,
};
use marketpulse_core::indicators::IndicatorSet;
use marketpulse_core::news::{synthetic_history, NewsDesk, NewsFeed, OpenAiSummarizer, SourceOutcome};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "marketpulse", about = "MarketPulse: daily market dashboard from the terminal")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Dashboard config (TOML). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct MarketArgs {
    /// Look-back: week, month, quarter, half-year, year. Defaults to the config's `days`.
    #[arg(long)]
    timeframe: Option<String>,

    /// Comma-separated indicators: ibs, sma, rsi, macd, bb. Defaults to the config's list.
    #[arg(long)]
    indicators: Option<String>,

    /// Read equity data from `{dir}/{ticker}.csv` instead of Yahoo Finance.
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summaries and latest indicator values for every configured asset.
    Snapshot {
        #[command(flatten)]
        market: MarketArgs,

        /// Print the full snapshot as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Full bar and indicator table for one asset (JSON).
    Asset {
        /// Asset name or upstream id (e.g. "Bitcoin", "^GSPC").
        query: String,

        #[command(flatten)]
        market: MarketArgs,
    },
    /// Gather news from the configured sources.
    News {
        /// Also request an AI macro summary.
        #[arg(long, default_value_t = false)]
        summarize: bool,
    },
    /// Keyword counts in current news.
    Keywords {
        /// Keywords to count (repeatable). Defaults to the config's list.
        #[arg(long = "keyword")]
        keywords: Vec<String>,

        /// Include the synthetic look-back series.
        #[arg(long, default_value_t = false)]
        history: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    match cli.command {
        Commands::Snapshot { market, json } => run_snapshot(config, &market, json),
        Commands::Asset { query, market } => run_asset(config, &query, &market),
        Commands::News { summarize } => run_news(&config, summarize),
        Commands::Keywords { keywords, history } => run_keywords(&config, keywords, history),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn build_dashboard(config: DashboardConfig, csv_dir: Option<&Path>) -> Result<Dashboard> {
    let equity: Arc<dyn EquityProvider> = match csv_dir {
        Some(dir) => {
            if !dir.is_dir() {
                bail!("--csv-dir {} is not a directory", dir.display());
            }
            Arc::new(CsvEquityProvider::new(dir))
        }
        None => Arc::new(YahooProvider::new(Arc::new(CircuitBreaker::default_provider(
            "yahoo",
        )))?),
    };
    let crypto: Arc<dyn CryptoProvider> = Arc::new(CoinGeckoProvider::new(Arc::new(
        CircuitBreaker::default_provider("coingecko"),
    ))?);
    Ok(Dashboard::new(config, equity, crypto))
}

fn resolve_market(config: &DashboardConfig, market: &MarketArgs) -> Result<(u32, IndicatorSet)> {
    let days = match &market.timeframe {
        Some(tf) => tf.parse::<Timeframe>()?.days(),
        None => config.days,
    };
    let set = match &market.indicators {
        Some(list) => list.parse::<IndicatorSet>()?,
        None => config.indicators.clone(),
    };
    Ok((days, set))
}

fn run_snapshot(config: DashboardConfig, market: &MarketArgs, as_json: bool) -> Result<()> {
    let (days, set) = resolve_market(&config, market)?;
    let dashboard = build_dashboard(config, market.csv_dir.as_deref())?;
    let views = dashboard.snapshot(days, &set);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!("Snapshot: last {days} days, indicators [{}]", set.key());
    for view in &views {
        print_view(view);
    }
    Ok(())
}

fn print_view(view: &AssetView) {
    println!();
    println!("{} ({})", view.asset.name, view.asset.id);
    match &view.status {
        AssetStatus::Unavailable { reason } => println!("  unavailable: {reason}"),
        AssetStatus::NoData => println!("  no data"),
        AssetStatus::Ready(report) => print_report(report),
    }
}

fn print_report(report: &AssetReport) {
    let series = report.series();
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        println!("  bars: {} ({} .. {})", series.len(), first.date, last.date);
    }
    if let Some(p) = &report.price {
        let change = p
            .change_pct
            .map_or_else(|| "n/a".to_string(), |c| format!("{c:+.2}%"));
        println!(
            "  close: {:.2} ({change})  range: {:.2} - {:.2}",
            p.last_close, p.period_low, p.period_high
        );
    }
    if let Some(v) = &report.volume {
        let vs = v
            .vs_average_pct
            .map_or_else(|| "n/a".to_string(), |x| format!("{x:+.1}%"));
        println!("  volume: {:.0} (vs avg {vs})", v.recent);
    }
    if let Some(s) = &report.ibs_summary {
        println!(
            "  ibs: {:.1}  avg {:.1}  high {:.1}  low {:.1}",
            s.current, s.average, s.high, s.low
        );
    }
    for column in report.augmented.columns() {
        match column.last_defined() {
            Some((date, value)) => println!("  {:<14} {value:.4} ({date})", column.name()),
            None => println!("  {:<14} n/a", column.name()),
        }
    }
}

/// One JSON object per bar with every indicator column as an extra key.
fn asset_table(report: &AssetReport) -> Value {
    let columns: Vec<_> = std::iter::once(&report.ibs)
        .chain(report.augmented.columns())
        .collect();
    let rows: Vec<Value> = report
        .series()
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let mut row = Map::new();
            row.insert("date".into(), json!(bar.date));
            row.insert("open".into(), json!(bar.open));
            row.insert("high".into(), json!(bar.high));
            row.insert("low".into(), json!(bar.low));
            row.insert("close".into(), json!(bar.close));
            row.insert("volume".into(), json!(bar.volume));
            for column in &columns {
                let value = column.values().get(i).copied().flatten();
                row.insert(column.name().to_string(), json!(value));
            }
            Value::Object(row)
        })
        .collect();
    Value::Array(rows)
}

fn run_asset(config: DashboardConfig, query: &str, market: &MarketArgs) -> Result<()> {
    let (days, set) = resolve_market(&config, market)?;
    let Some(asset) = config.find_asset(query).cloned() else {
        let known: Vec<&str> = config.assets.iter().map(|a| a.name.as_str()).collect();
        bail!("unknown asset '{query}'. Configured: {}", known.join(", "));
    };
    let dashboard = build_dashboard(config, market.csv_dir.as_deref())?;
    let view = dashboard.asset_view(&asset, days, &set);

    let output = match &view.status {
        AssetStatus::Ready(report) => json!({
            "asset": view.asset,
            "price": report.price,
            "volume": report.volume,
            "ibs": report.ibs_summary,
            "rows": asset_table(report),
        }),
        AssetStatus::NoData => bail!("{}: no data for the last {days} days", asset.name),
        AssetStatus::Unavailable { reason } => bail!("{}: unavailable: {reason}", asset.name),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn news_desk(config: &DashboardConfig) -> Result<NewsDesk> {
    let summarizer = OpenAiSummarizer::from_config(&config.summary)?;
    Ok(NewsDesk::new(
        NewsDesk::http_sources(&config.news.summary_sources),
        NewsDesk::http_sources(&config.news.keyword_sources),
        Box::new(summarizer),
        &config.cache,
    ))
}

fn print_outcomes(outcomes: &[SourceOutcome]) {
    for outcome in outcomes {
        match outcome {
            SourceOutcome::Ok { name, chars } => println!("  ok      {name} ({chars} chars)"),
            SourceOutcome::Failed { name, error } => println!("  failed  {name}: {error}"),
        }
    }
}

fn run_news(config: &DashboardConfig, summarize: bool) -> Result<()> {
    let desk = news_desk(config)?;
    let digest = desk.digest(NewsFeed::Summary);

    println!("News sources:");
    print_outcomes(&digest.outcomes);
    if digest.is_empty() {
        bail!("no news source returned text");
    }

    if summarize {
        println!();
        match desk.summary() {
            Ok(summary) => println!("{summary}"),
            Err(e) => eprintln!("Summary unavailable: {e}"),
        }
    } else {
        let preview: String = digest.text.chars().take(600).collect();
        println!();
        println!("{preview}...");
    }
    Ok(())
}

fn run_keywords(config: &DashboardConfig, keywords: Vec<String>, history: bool) -> Result<()> {
    let keywords = if keywords.is_empty() {
        config.news.keywords.clone()
    } else {
        keywords
    };
    let desk = news_desk(config)?;
    let report = desk.keywords(&keywords);

    println!("News sources:");
    print_outcomes(&report.outcomes);

    let Some(current) = report.current else {
        bail!("keyword counts unavailable: no news source returned text");
    };

    println!();
    println!("Current counts:");
    for (keyword, count) in &current {
        println!("  {keyword:<16} {count}");
    }

    if history {
        let today = chrono::Local::now().date_naive();
        println!();
        println!(
            "Look-back ({} days). Only today's values are measured; earlier values are synthetic estimates.",
            config.news.history_days
        );
        for point in synthetic_history(&current, config.news.history_days, today) {
            let marker = if point.synthetic { "est" } else { "measured" };
            println!("  {}  {:<16} {:>5}  {marker}", point.date, point.keyword, point.count);
        }
    }
    Ok(())
}
