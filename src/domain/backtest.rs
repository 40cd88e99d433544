//! Historical backtest of the EPS × median P/E model.
//!
//! For each year the model price is the ticker's EPS times its sub-industry's
//! universe-wide median P/E. A model price above the actual price predicts an
//! up move. Predictions are scored against the realized move one and two
//! years later, then summed per ticker, per peer group and over the universe.

use crate::domain::company::{CompanyRecord, SubIndustryCode};
use crate::domain::error::PeervalError;
use crate::domain::hit_rate::{Direction, HORIZONS, HitRateStat, HorizonStats};
use crate::domain::pe::{positive_eps, usable_multiple};
use crate::domain::peer::resolve;
use crate::ports::reference_data_port::ReferenceDataPort;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestRecord {
    pub year: i32,
    /// Reported EPS, including non-positive values.
    pub eps: Option<f64>,
    pub median_pe: Option<f64>,
    /// Absent whenever EPS is non-positive or the median P/E is missing.
    pub model_price: Option<f64>,
    pub actual_price: Option<f64>,
    pub prediction: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerBacktest {
    pub ticker: String,
    pub sub_industry: SubIndustryCode,
    pub records: Vec<BacktestRecord>,
    pub stats: HorizonStats,
}

impl TickerBacktest {
    pub fn one_year(&self) -> HitRateStat {
        self.stats.one_year
    }

    pub fn two_year(&self) -> HitRateStat {
        self.stats.two_year
    }

    pub fn combined(&self) -> HitRateStat {
        self.stats.combined()
    }

    /// Prediction for the most recent year, if one could be made.
    pub fn latest_prediction(&self) -> Option<(i32, Direction)> {
        self.records
            .last()
            .and_then(|r| r.prediction.map(|p| (r.year, p)))
    }
}

/// Ticker, peer-group and universe accuracy for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub ticker: TickerBacktest,
    pub peer_group: HorizonStats,
    pub peer_group_size: usize,
    pub universe: HorizonStats,
}

/// Year-by-year model and actual prices for `company`, priced with the median
/// P/E series of `code`.
pub fn build_records(
    store: &dyn ReferenceDataPort,
    company: &CompanyRecord,
    code: &SubIndustryCode,
) -> Vec<BacktestRecord> {
    store
        .years()
        .map(|year| {
            let eps = company.eps_at(year);
            let median_pe = store.median_pe(code, year).and_then(usable_multiple);
            let model_price = match (positive_eps(eps), median_pe) {
                (Some(e), Some(m)) => Some(e * m),
                _ => None,
            };
            let actual_price = store.actual_price(&company.ticker, year);
            let prediction = match (model_price, actual_price) {
                (Some(model), Some(actual)) => Some(Direction::between(actual, model)),
                _ => None,
            };
            BacktestRecord {
                year,
                eps,
                median_pe,
                model_price,
                actual_price,
                prediction,
            }
        })
        .collect()
}

/// Scores every prediction against each horizon whose start and end actual
/// prices are both present. Years without a prediction contribute nothing.
pub fn score_records(records: &[BacktestRecord]) -> HorizonStats {
    let Some(first_year) = records.first().map(|r| r.year) else {
        return HorizonStats::default();
    };
    let actual_at = |year: i32| -> Option<f64> {
        let idx = usize::try_from(year - first_year).ok()?;
        records.get(idx).and_then(|r| r.actual_price)
    };

    let mut stats = HorizonStats::default();
    for record in records {
        let (Some(predicted), Some(start)) = (record.prediction, record.actual_price) else {
            continue;
        };
        for horizon in HORIZONS {
            if let Some(end) = actual_at(record.year + horizon) {
                stats.record(horizon, predicted, Direction::between(start, end));
            }
        }
    }
    stats
}

/// Ticker-level accuracy using the ticker's own sub-industry series.
pub fn ticker_stats(store: &dyn ReferenceDataPort, company: &CompanyRecord) -> HorizonStats {
    score_records(&build_records(store, company, &company.sub_industry))
}

pub fn backtest(store: &dyn ReferenceDataPort, ticker: &str) -> Result<TickerBacktest, PeervalError> {
    let group = resolve(store, ticker)?;
    let company = store
        .company(ticker)
        .ok_or_else(|| PeervalError::not_found(ticker))?;

    if !store.has_actual_prices(ticker) {
        tracing::warn!(ticker, "no actual price row, hit rate will be unavailable");
    }

    let records = build_records(store, company, &group.sub_industry);
    let stats = score_records(&records);

    Ok(TickerBacktest {
        ticker: company.ticker.clone(),
        sub_industry: group.sub_industry,
        records,
        stats,
    })
}

/// Sum of per-member accuracy across the ticker's peer group. Every member is
/// priced with the group's median P/E series; members without an actual-price
/// row are skipped.
pub fn peer_group_hit_rate(
    store: &dyn ReferenceDataPort,
    ticker: &str,
) -> Result<HorizonStats, PeervalError> {
    let group = resolve(store, ticker)?;
    let mut skipped = 0usize;
    let stats: HorizonStats = group
        .members
        .iter()
        .filter_map(|member| {
            if !store.has_actual_prices(member) {
                skipped += 1;
                return None;
            }
            let company = store.company(member)?;
            Some(score_records(&build_records(store, company, &group.sub_industry)))
        })
        .sum();
    tracing::debug!(
        ticker,
        members = group.members.len(),
        skipped,
        "peer group hit rate computed"
    );
    Ok(stats)
}

/// Sum of per-ticker accuracy over the whole universe, each ticker priced
/// with its own sub-industry series.
pub fn universe_hit_rate(store: &dyn ReferenceDataPort) -> HorizonStats {
    let mut skipped = 0usize;
    let stats: HorizonStats = store
        .tickers()
        .iter()
        .filter_map(|ticker| {
            if !store.has_actual_prices(ticker) {
                skipped += 1;
                return None;
            }
            store.company(ticker).map(|c| ticker_stats(store, c))
        })
        .sum();
    tracing::debug!(
        tickers = store.tickers().len(),
        skipped,
        scored = stats.combined().total,
        "universe hit rate computed"
    );
    stats
}

pub fn run_report(store: &dyn ReferenceDataPort, ticker: &str) -> Result<BacktestReport, PeervalError> {
    let ticker_result = backtest(store, ticker)?;
    let peer_group_size = resolve(store, ticker)?.members.len();
    let peer_group = peer_group_hit_rate(store, ticker)?;
    let universe = universe_hit_rate(store);
    Ok(BacktestReport {
        ticker: ticker_result,
        peer_group,
        peer_group_size,
        universe,
    })
}
