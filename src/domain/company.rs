//! Company records and annual series.

use serde::Serialize;
use std::fmt;

/// Opaque sub-industry classification code (e.g. a GICS `gsubind`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubIndustryCode(String);

impl SubIndustryCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubIndustryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubIndustryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// One value per year over a contiguous range, any of which may be missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSeries {
    first_year: i32,
    values: Vec<Option<f64>>,
}

impl AnnualSeries {
    /// Non-finite inputs are stored as missing.
    pub fn new(first_year: i32, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Self { first_year, values }
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        let offset = year.checked_sub(self.first_year)?;
        let idx = usize::try_from(offset).ok()?;
        self.values.get(idx).copied().flatten()
    }

    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyRecord {
    pub ticker: String,
    pub sub_industry: SubIndustryCode,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub eps: AnnualSeries,
    pub prices: AnnualSeries,
}

impl CompanyRecord {
    pub fn eps_at(&self, year: i32) -> Option<f64> {
        self.eps.get(year)
    }

    pub fn price_at(&self, year: i32) -> Option<f64> {
        self.prices.get(year)
    }
}
