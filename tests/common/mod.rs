#![allow(dead_code)]

use peerval::domain::company::{AnnualSeries, CompanyRecord, SubIndustryCode};
use peerval::domain::store::{ReferenceDataStore, ReferenceDataStoreBuilder};
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Fluent builder over [`ReferenceDataStoreBuilder`] for tests.
pub struct StoreFixture {
    years: RangeInclusive<i32>,
    builder: ReferenceDataStoreBuilder,
}

impl StoreFixture {
    pub fn new(years: RangeInclusive<i32>) -> Self {
        Self {
            builder: ReferenceDataStore::builder(years.clone()),
            years,
        }
    }

    /// Adds a company whose EPS and price series start at the fixture's
    /// first year.
    pub fn company(
        mut self,
        ticker: &str,
        code: &str,
        eps: &[Option<f64>],
        prices: &[Option<f64>],
    ) -> Self {
        let first = *self.years.start();
        self.builder
            .add_company(CompanyRecord {
                ticker: ticker.to_string(),
                sub_industry: SubIndustryCode::new(code),
                sector: None,
                industry: None,
                eps: AnnualSeries::new(first, eps.to_vec()),
                prices: AnnualSeries::new(first, prices.to_vec()),
            })
            .unwrap();
        self
    }

    /// Company with a single data year, for valuation-only tests.
    pub fn priced(self, ticker: &str, code: &str, eps: f64, price: f64) -> Self {
        self.company(ticker, code, &[Some(eps)], &[Some(price)])
    }

    pub fn median_pe(mut self, code: &str, values: &[Option<f64>]) -> Self {
        let first = *self.years.start();
        self.builder
            .add_median_pe(SubIndustryCode::new(code), AnnualSeries::new(first, values.to_vec()));
        self
    }

    pub fn actual_prices(mut self, ticker: &str, values: &[Option<f64>]) -> Self {
        let first = *self.years.start();
        self.builder
            .add_actual_prices(ticker, AnnualSeries::new(first, values.to_vec()));
        self
    }

    pub fn build(self) -> ReferenceDataStore {
        self.builder.build()
    }
}

/// Subject X in 5010 with EPS 2.00 and three peers trading at P/E 10, 12
/// and 14 in 2024.
pub fn peer_median_store(subject_price: f64) -> ReferenceDataStore {
    StoreFixture::new(2024..=2024)
        .priced("X", "5010", 2.0, subject_price)
        .priced("P1", "5010", 1.0, 10.0)
        .priced("P2", "5010", 2.0, 24.0)
        .priced("P3", "5010", 0.5, 7.0)
        .priced("OTHER", "2020", 1.0, 50.0)
        .build()
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    path
}

pub const COMPANIES_CSV: &str = "\
ticker,gsubind,sector,industry,eps_2020,eps_2021,eps_2022,eps_2023,price_2020,price_2021,price_2022,price_2023
AAA,45202030,Information Technology,Hardware,2.0,2.5,3.0,3.0,30,40,45,50
BBB,45202030,Information Technology,Hardware,1.0,-0.5,1.5,2.0,18,15,22,24
CCC,45202030.0,Information Technology,Hardware,4.0,4.0,4.5,5.0,50,52,60,70
DDD,10102010,Energy,Oil & Gas,3.0,3.5,,4.0,25,30,28,36
";

pub const MEDIAN_PE_CSV: &str = "\
gsubind,2020,2021,2022,2023
45202030,14.0,15.0,13.0,14.0
10102010,9.0,9.5,8.0,
";

pub const ACTUAL_PRICES_CSV: &str = "\
ticker,2020,2021,2022,2023
AAA,30,40,45,50
BBB,18,15,22,24
CCC,50,52,60,70
";

/// Writes the three CSVs and an INI pointing at them. Returns the INI path.
pub fn write_universe(dir: &Path, valuation_section: &str) -> PathBuf {
    let companies = write_file(dir, "companies.csv", COMPANIES_CSV);
    let median_pe = write_file(dir, "median_pe.csv", MEDIAN_PE_CSV);
    let actual = write_file(dir, "actual_prices.csv", ACTUAL_PRICES_CSV);
    let ini = format!(
        "[data]\ncompanies = {}\nmedian_pe = {}\nactual_prices = {}\n\n{}",
        companies.display(),
        median_pe.display(),
        actual.display(),
        valuation_section
    );
    write_file(dir, "peerval.ini", &ini)
}
