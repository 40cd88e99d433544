//! CLI definition and dispatch.
//!
//! Every command loads the INI config, builds the reference data store from the
//! configured CSV files, runs one engine, and renders the result to stdout.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestReport, run_report};
use crate::domain::config_validation::{parse_policy, parse_year, validate_config};
use crate::domain::error::PeervalError;
use crate::domain::hit_rate::HitRateStat;
use crate::domain::peer::resolve;
use crate::domain::store::ReferenceDataStore;
use crate::domain::universe::UniverseSummary;
use crate::domain::valuation::{RecommendationPolicy, ValuationResult, valuate};
use crate::ports::config_port::ConfigPort;
use crate::ports::reference_data_port::ReferenceDataPort;

#[derive(Parser, Debug)]
#[command(name = "peerval", about = "Peer P/E valuation and backtest workbench")]
pub struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Value a ticker against its sub-industry peers
    Valuate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
        #[arg(long)]
        year: Option<i32>,
        /// banded | median-only
        #[arg(long)]
        policy: Option<RecommendationPolicy>,
        #[arg(long)]
        json: bool,
    },
    /// Backtest the EPS x median P/E model for a ticker
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
        #[arg(long)]
        json: bool,
    },
    /// Show a ticker's sub-industry and competitors
    Peers {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        ticker: String,
    },
    /// List every ticker in the universe
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Summarize the loaded universe
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file without loading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Valuate {
            config,
            ticker,
            year,
            policy,
            json,
        } => run_valuate(&config, &ticker, year, policy, json),
        Command::Backtest {
            config,
            ticker,
            json,
        } => run_backtest(&config, &ticker, json),
        Command::Peers { config, ticker } => run_peers(&config, &ticker),
        Command::ListTickers { config } => run_list_tickers(&config),
        Command::Info { config, json } => run_info(&config, json),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PeervalError> {
    tracing::info!("loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn load_store(config: &dyn ConfigPort) -> Result<ReferenceDataStore, PeervalError> {
    CsvAdapter::from_config(config)?.load()
}

/// CLI flag, then `[valuation] year`, then the last year in the store.
pub fn resolve_year(
    cli_year: Option<i32>,
    config: &dyn ConfigPort,
    store: &dyn ReferenceDataPort,
) -> Result<i32, PeervalError> {
    let years = store.years();
    let year = match cli_year {
        Some(y) => y,
        None => parse_year(config)?.unwrap_or(*years.end()),
    };
    if !years.contains(&year) {
        return Err(PeervalError::ConfigInvalid {
            section: "valuation".to_string(),
            key: "year".to_string(),
            reason: format!(
                "{year} is outside the data range {}-{}",
                years.start(),
                years.end()
            ),
        });
    }
    Ok(year)
}

pub fn resolve_policy(
    cli_policy: Option<RecommendationPolicy>,
    config: &dyn ConfigPort,
) -> Result<RecommendationPolicy, PeervalError> {
    match cli_policy {
        Some(p) => Ok(p),
        None => parse_policy(config),
    }
}

fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PeervalError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| PeervalError::Io(std::io::Error::other(e)))?;
    println!("{text}");
    Ok(())
}

fn run_valuate(
    config_path: &Path,
    ticker: &str,
    year: Option<i32>,
    policy: Option<RecommendationPolicy>,
    json: bool,
) -> Result<(), PeervalError> {
    let config = load_config(config_path)?;
    let store = load_store(&config)?;
    let year = resolve_year(year, &config, &store)?;
    let policy = resolve_policy(policy, &config)?;

    let result = valuate(&store, &normalize_ticker(ticker), year, policy)?;
    if json {
        print_json(&result)
    } else {
        print!("{}", render_valuation(&result));
        Ok(())
    }
}

fn run_backtest(config_path: &Path, ticker: &str, json: bool) -> Result<(), PeervalError> {
    let config = load_config(config_path)?;
    let store = load_store(&config)?;

    let report = run_report(&store, &normalize_ticker(ticker))?;
    if json {
        print_json(&report)
    } else {
        print!("{}", render_backtest(&report));
        Ok(())
    }
}

fn run_peers(config_path: &Path, ticker: &str) -> Result<(), PeervalError> {
    let config = load_config(config_path)?;
    let store = load_store(&config)?;
    let ticker = normalize_ticker(ticker);

    let group = resolve(&store, &ticker)?;
    let company = store
        .company(&ticker)
        .ok_or_else(|| PeervalError::not_found(&ticker))?;

    println!("Ticker:       {}", group.subject);
    println!("Sub-industry: {}", group.sub_industry);
    println!("Sector:       {}", company.sector.as_deref().unwrap_or("N/A"));
    println!("Industry:     {}", company.industry.as_deref().unwrap_or("N/A"));
    let competitors: Vec<&str> = group.competitors().collect();
    if competitors.is_empty() {
        println!("Competitors:  None");
    } else {
        println!("Competitors:  {}", competitors.join(", "));
    }
    Ok(())
}

fn run_list_tickers(config_path: &Path) -> Result<(), PeervalError> {
    let config = load_config(config_path)?;
    let store = load_store(&config)?;
    for ticker in store.tickers() {
        println!("{ticker}");
    }
    tracing::info!("{} tickers", store.tickers().len());
    Ok(())
}

fn run_info(config_path: &Path, json: bool) -> Result<(), PeervalError> {
    let config = load_config(config_path)?;
    let store = load_store(&config)?;
    let summary = UniverseSummary::compute(&store);
    if json {
        print_json(&summary)
    } else {
        print!("{}", render_summary(&summary));
        Ok(())
    }
}

fn run_validate(config_path: &Path) -> Result<(), PeervalError> {
    let config = load_config(config_path)?;
    let policy = parse_policy(&config)?;
    let year = parse_year(&config)?;

    println!("Configuration is valid.");
    println!("  policy: {policy}");
    match year {
        Some(y) => println!("  year:   {y}"),
        None => println!("  year:   latest available"),
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

pub fn format_stat(stat: &HitRateStat) -> String {
    match stat.percentage() {
        Some(pct) => format!("{pct:.2}% ({}/{})", stat.correct, stat.total),
        None => "not available (no scored predictions)".to_string(),
    }
}

pub fn render_valuation(result: &ValuationResult) -> String {
    let mut out = String::new();
    let year = result.evaluation_year;
    let _ = writeln!(out, "=== Valuation: {} ({year}) ===", result.ticker);
    let _ = writeln!(out, "Sub-industry:       {}", result.peers.sub_industry);
    let _ = writeln!(out, "Policy:             {}", result.policy);
    let _ = writeln!(out, "EPS:                {}", fmt_opt(result.eps));
    let _ = writeln!(out, "Own P/E:            {}", fmt_opt(result.subject_pe));
    let _ = writeln!(out, "Current price:      {}", fmt_opt(result.current_price));

    if result.comparables.is_empty() {
        let _ = writeln!(out, "Peer P/E:           no valid comparables");
    } else {
        let _ = writeln!(out, "Comparables ({}):", result.comparables.len());
        for c in &result.comparables {
            let _ = writeln!(out, "  {:<10} {:>8.2}", c.ticker, c.pe);
        }
    }
    if let Some(pe) = &result.peer_pe {
        let _ = writeln!(
            out,
            "Peer P/E:           low {:.2} / median {:.2} / high {:.2}",
            pe.low, pe.median, pe.high
        );
    }
    match &result.implied_price {
        Some(p) => {
            let _ = writeln!(
                out,
                "Implied price:      low {:.2} / median {:.2} / high {:.2}",
                p.low, p.median, p.high
            );
        }
        None => {
            let _ = writeln!(out, "Implied price:      N/A");
        }
    }
    if let Some(gap) = result.gap_pct {
        let side = if gap > 0.0 { "below" } else { "above" };
        let _ = writeln!(
            out,
            "Gap:                {:.1}% {side} the implied median",
            gap.abs()
        );
    }
    let _ = writeln!(out, "Recommendation:     {}", result.recommendation);
    out
}

pub fn render_backtest(report: &BacktestReport) -> String {
    let mut out = String::new();
    let bt = &report.ticker;
    let _ = writeln!(out, "=== Backtest: {} (sub-industry {}) ===", bt.ticker, bt.sub_industry);
    let _ = writeln!(
        out,
        "{:<6} {:>9} {:>10} {:>12} {:>13} {:>10}",
        "Year", "EPS", "Median PE", "Model Price", "Actual Price", "Prediction"
    );
    for r in &bt.records {
        let _ = writeln!(
            out,
            "{:<6} {:>9} {:>10} {:>12} {:>13} {:>10}",
            r.year,
            fmt_opt(r.eps),
            fmt_opt(r.median_pe),
            fmt_opt(r.model_price),
            fmt_opt(r.actual_price),
            r.prediction.map_or_else(|| "-".to_string(), |d| d.to_string()),
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Ticker 1-year:      {}", format_stat(&bt.one_year()));
    let _ = writeln!(out, "Ticker 2-year:      {}", format_stat(&bt.two_year()));
    let _ = writeln!(out, "Ticker combined:    {}", format_stat(&bt.combined()));
    let _ = writeln!(
        out,
        "Peer group ({:>3}):   {}",
        report.peer_group_size,
        format_stat(&report.peer_group.combined())
    );
    let _ = writeln!(out, "Universe:           {}", format_stat(&report.universe.combined()));
    match bt.latest_prediction() {
        Some((year, direction)) => {
            let _ = writeln!(out, "Final prediction for {year}: {direction}");
        }
        None => {
            let _ = writeln!(out, "Final prediction: not available");
        }
    }
    out
}

pub fn render_summary(summary: &UniverseSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Universe ===");
    let _ = writeln!(out, "Tickers tracked:     {}", summary.tickers);
    let _ = writeln!(out, "Sub-industries:      {}", summary.sub_industries);
    let _ = writeln!(
        out,
        "Years of history:    {} ({}-{})",
        summary.years_of_history, summary.first_year, summary.last_year
    );
    let _ = writeln!(out, "Raw data points:     {}", summary.raw_data_points);
    let _ = writeln!(
        out,
        "With actual prices:  {}",
        summary.tickers_with_actual_prices
    );
    let _ = writeln!(out, "Backtest samples:    {}", summary.backtest_samples.total);
    let _ = writeln!(
        out,
        "Universe hit rate:   {}",
        format_stat(&summary.backtest_samples)
    );
    out
}
