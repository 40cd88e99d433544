//! Reference data query port.

use crate::domain::company::{CompanyRecord, SubIndustryCode};
use std::ops::RangeInclusive;

/// Read-only query surface over a loaded snapshot of the universe.
///
/// Every lookup returns an explicit `Option`; a missing value is a normal data
/// gap and never a sentinel that flows into arithmetic.
pub trait ReferenceDataPort {
    fn company(&self, ticker: &str) -> Option<&CompanyRecord>;

    /// All tickers, in order of first appearance in the source.
    fn tickers(&self) -> &[String];

    fn median_pe(&self, code: &SubIndustryCode, year: i32) -> Option<f64>;

    fn actual_price(&self, ticker: &str, year: i32) -> Option<f64>;

    /// Whether the actual-price table carries a row for `ticker` at all.
    fn has_actual_prices(&self, ticker: &str) -> bool;

    fn years(&self) -> RangeInclusive<i32>;
}
