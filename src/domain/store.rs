//! Immutable in-memory reference data store.
//!
//! Built once per session through [`ReferenceDataStoreBuilder`] and then only
//! read. Engines receive it by reference through [`ReferenceDataPort`].

use crate::domain::company::{AnnualSeries, CompanyRecord, SubIndustryCode};
use crate::domain::error::PeervalError;
use crate::ports::reference_data_port::ReferenceDataPort;
use std::collections::HashMap;
use std::ops::RangeInclusive;

#[derive(Debug, Clone)]
pub struct ReferenceDataStore {
    years: RangeInclusive<i32>,
    companies: Vec<CompanyRecord>,
    tickers: Vec<String>,
    index: HashMap<String, usize>,
    median_pe: HashMap<SubIndustryCode, AnnualSeries>,
    actual_prices: HashMap<String, AnnualSeries>,
}

impl ReferenceDataStore {
    pub fn builder(years: RangeInclusive<i32>) -> ReferenceDataStoreBuilder {
        ReferenceDataStoreBuilder::new(years)
    }

    pub fn companies(&self) -> &[CompanyRecord] {
        &self.companies
    }

    pub fn sub_industry_count(&self) -> usize {
        let mut codes: Vec<&SubIndustryCode> =
            self.companies.iter().map(|c| &c.sub_industry).collect();
        codes.sort();
        codes.dedup();
        codes.len()
    }

    fn in_range(&self, year: i32) -> bool {
        self.years.contains(&year)
    }
}

impl ReferenceDataPort for ReferenceDataStore {
    fn company(&self, ticker: &str) -> Option<&CompanyRecord> {
        self.index.get(ticker).map(|&i| &self.companies[i])
    }

    fn tickers(&self) -> &[String] {
        &self.tickers
    }

    fn median_pe(&self, code: &SubIndustryCode, year: i32) -> Option<f64> {
        if !self.in_range(year) {
            return None;
        }
        self.median_pe.get(code).and_then(|s| s.get(year))
    }

    fn actual_price(&self, ticker: &str, year: i32) -> Option<f64> {
        if !self.in_range(year) {
            return None;
        }
        self.actual_prices.get(ticker).and_then(|s| s.get(year))
    }

    fn has_actual_prices(&self, ticker: &str) -> bool {
        self.actual_prices.contains_key(ticker)
    }

    fn years(&self) -> RangeInclusive<i32> {
        self.years.clone()
    }
}

#[derive(Debug)]
pub struct ReferenceDataStoreBuilder {
    years: RangeInclusive<i32>,
    companies: Vec<CompanyRecord>,
    index: HashMap<String, usize>,
    median_pe: HashMap<SubIndustryCode, AnnualSeries>,
    actual_prices: HashMap<String, AnnualSeries>,
}

impl ReferenceDataStoreBuilder {
    pub fn new(years: RangeInclusive<i32>) -> Self {
        Self {
            years,
            companies: Vec::new(),
            index: HashMap::new(),
            median_pe: HashMap::new(),
            actual_prices: HashMap::new(),
        }
    }

    pub fn contains_company(&self, ticker: &str) -> bool {
        self.index.contains_key(ticker)
    }

    /// Ticker order is the order of insertion. Duplicates are rejected.
    pub fn add_company(&mut self, record: CompanyRecord) -> Result<(), PeervalError> {
        if self.contains_company(&record.ticker) {
            return Err(PeervalError::DataLoad {
                reason: format!("duplicate ticker {}", record.ticker),
            });
        }
        self.index
            .insert(record.ticker.clone(), self.companies.len());
        self.companies.push(record);
        Ok(())
    }

    /// A later series for the same code replaces the earlier one.
    pub fn add_median_pe(&mut self, code: SubIndustryCode, series: AnnualSeries) {
        if self.median_pe.insert(code.clone(), series).is_some() {
            tracing::warn!(%code, "median P/E row repeated, keeping the last one");
        }
    }

    /// A later series for the same ticker replaces the earlier one.
    pub fn add_actual_prices(&mut self, ticker: impl Into<String>, series: AnnualSeries) {
        let ticker = ticker.into();
        if self.actual_prices.insert(ticker.clone(), series).is_some() {
            tracing::warn!(%ticker, "actual price row repeated, keeping the last one");
        }
    }

    pub fn build(self) -> ReferenceDataStore {
        let tickers = self.companies.iter().map(|c| c.ticker.clone()).collect();
        tracing::debug!(
            companies = self.companies.len(),
            median_pe_groups = self.median_pe.len(),
            actual_price_rows = self.actual_prices.len(),
            "reference data store built"
        );
        ReferenceDataStore {
            years: self.years,
            companies: self.companies,
            tickers,
            index: self.index,
            median_pe: self.median_pe,
            actual_prices: self.actual_prices,
        }
    }
}
