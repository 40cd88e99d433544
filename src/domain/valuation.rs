//! Peer-relative P/E valuation.
//!
//! The subject's implied fair value is its own EPS multiplied by the low,
//! median and high P/E of its competitors in the evaluation year. The subject
//! never contributes to the multiple it is valued against.

use crate::domain::error::PeervalError;
use crate::domain::pe::{MultipleRange, pe_ratio, positive_eps};
use crate::domain::peer::{PeerGroup, resolve};
use crate::ports::reference_data_port::ReferenceDataPort;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Below this fraction of the implied median a stock is undervalued.
pub const UNDERVALUED_BAND: f64 = 0.95;
/// Above this multiple of the implied median a stock is overvalued.
pub const OVERVALUED_BAND: f64 = 1.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    Undervalued,
    FairlyPriced,
    Overvalued,
    InsufficientData,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Undervalued => write!(f, "Undervalued"),
            Recommendation::FairlyPriced => write!(f, "Fairly priced"),
            Recommendation::Overvalued => write!(f, "Overvalued"),
            Recommendation::InsufficientData => write!(f, "Insufficient data"),
        }
    }
}

/// How a current price is compared against the implied median price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPolicy {
    /// Undervalued below 95% of the implied median, overvalued above 110%,
    /// fairly priced in between.
    #[default]
    Banded,
    /// Undervalued when the implied median exceeds the price, otherwise
    /// overvalued. Never yields `FairlyPriced`.
    MedianOnly,
}

impl RecommendationPolicy {
    pub fn classify(&self, current_price: f64, implied_median: f64) -> Recommendation {
        match self {
            RecommendationPolicy::Banded => {
                if current_price < UNDERVALUED_BAND * implied_median {
                    Recommendation::Undervalued
                } else if current_price > OVERVALUED_BAND * implied_median {
                    Recommendation::Overvalued
                } else {
                    Recommendation::FairlyPriced
                }
            }
            RecommendationPolicy::MedianOnly => {
                if implied_median > current_price {
                    Recommendation::Undervalued
                } else {
                    Recommendation::Overvalued
                }
            }
        }
    }
}

impl fmt::Display for RecommendationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationPolicy::Banded => write!(f, "banded"),
            RecommendationPolicy::MedianOnly => write!(f, "median_only"),
        }
    }
}

impl FromStr for RecommendationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "banded" => Ok(RecommendationPolicy::Banded),
            "median_only" | "median" => Ok(RecommendationPolicy::MedianOnly),
            other => Err(format!(
                "unknown recommendation policy '{other}' (expected banded or median_only)"
            )),
        }
    }
}

/// A competitor's usable P/E in the evaluation year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerMultiple {
    pub ticker: String,
    pub pe: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    pub ticker: String,
    pub peers: PeerGroup,
    pub evaluation_year: i32,
    pub eps: Option<f64>,
    pub subject_pe: Option<f64>,
    pub comparables: Vec<PeerMultiple>,
    pub peer_pe: Option<MultipleRange>,
    pub implied_price: Option<MultipleRange>,
    pub current_price: Option<f64>,
    /// Percentage distance of the current price below the implied median.
    /// Negative when trading above it.
    pub gap_pct: Option<f64>,
    pub recommendation: Recommendation,
    pub policy: RecommendationPolicy,
}

impl ValuationResult {
    pub fn has_implied_price(&self) -> bool {
        self.implied_price.is_some()
    }
}

pub fn valuate(
    store: &dyn ReferenceDataPort,
    ticker: &str,
    year: i32,
    policy: RecommendationPolicy,
) -> Result<ValuationResult, PeervalError> {
    let peers = resolve(store, ticker)?;
    let subject = store
        .company(ticker)
        .ok_or_else(|| PeervalError::not_found(ticker))?;

    let raw_eps = subject.eps_at(year);
    let current_price = subject.price_at(year);
    let subject_pe = pe_ratio(current_price, raw_eps);

    let comparables: Vec<PeerMultiple> = peers
        .competitors()
        .filter_map(|t| {
            let peer = store.company(t)?;
            let pe = pe_ratio(peer.price_at(year), peer.eps_at(year))?;
            Some(PeerMultiple {
                ticker: t.to_string(),
                pe,
            })
        })
        .collect();

    let multiples: Vec<f64> = comparables.iter().map(|c| c.pe).collect();
    let peer_pe = MultipleRange::from_values(&multiples);

    let implied_price = match (positive_eps(raw_eps), peer_pe) {
        (Some(eps), Some(range)) => Some(range.scale(eps)),
        _ => None,
    };

    let usable_price = current_price.filter(|p| *p > 0.0);
    let (recommendation, gap_pct) = match (implied_price, usable_price) {
        (Some(implied), Some(price)) if implied.median > 0.0 => (
            policy.classify(price, implied.median),
            Some((implied.median - price) / implied.median * 100.0),
        ),
        _ => (Recommendation::InsufficientData, None),
    };

    tracing::debug!(
        ticker,
        year,
        comparables = comparables.len(),
        %recommendation,
        "valuation computed"
    );

    Ok(ValuationResult {
        ticker: subject.ticker.clone(),
        peers,
        evaluation_year: year,
        eps: raw_eps,
        subject_pe,
        comparables,
        peer_pe,
        implied_price,
        current_price,
        gap_pct,
        recommendation,
        policy,
    })
}
