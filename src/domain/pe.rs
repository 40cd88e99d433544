//! P/E multiples and their summary statistics.

use serde::Serialize;

/// Price-to-earnings ratio with masking applied.
///
/// Returns `None` unless EPS is strictly positive, the price is present, and
/// the resulting multiple is finite and strictly positive.
pub fn pe_ratio(price: Option<f64>, eps: Option<f64>) -> Option<f64> {
    let eps = eps.filter(|e| *e > 0.0)?;
    let price = price?;
    usable_multiple(price / eps)
}

/// A multiple is usable only when finite and strictly positive.
pub fn usable_multiple(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// EPS is usable for pricing only when finite and strictly positive.
pub fn positive_eps(eps: Option<f64>) -> Option<f64> {
    eps.filter(|e| e.is_finite() && *e > 0.0)
}

/// Median of a non-empty slice; mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Low / median / high triple, used for both multiples and implied prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MultipleRange {
    pub low: f64,
    pub median: f64,
    pub high: f64,
}

impl MultipleRange {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let median = median(values)?;
        let low = values.iter().copied().fold(f64::INFINITY, f64::min);
        let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { low, median, high })
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            low: self.low * factor,
            median: self.median * factor,
            high: self.high * factor,
        }
    }
}
