//! CSV reference data adapter.
//!
//! Loads three tables into a [`ReferenceDataStore`]:
//!
//! - companies: `ticker, gsubind, sector, industry, eps_<YYYY>..., price_<YYYY>...`
//! - median P/E: `gsubind, <YYYY>...`
//! - actual prices: `ticker, <YYYY>...`
//!
//! Blank or non-numeric cells become missing values.

use crate::domain::company::{AnnualSeries, CompanyRecord, SubIndustryCode};
use crate::domain::error::PeervalError;
use crate::domain::store::ReferenceDataStore;
use crate::ports::config_port::ConfigPort;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    companies: PathBuf,
    median_pe: PathBuf,
    actual_prices: PathBuf,
}

impl CsvAdapter {
    pub fn new(companies: PathBuf, median_pe: PathBuf, actual_prices: PathBuf) -> Self {
        Self {
            companies,
            median_pe,
            actual_prices,
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PeervalError> {
        let path = |key: &str| {
            config
                .get_path("data", key)
                .ok_or_else(|| PeervalError::ConfigMissing {
                    section: "data".to_string(),
                    key: key.to_string(),
                })
        };
        Ok(Self::new(
            path("companies")?,
            path("median_pe")?,
            path("actual_prices")?,
        ))
    }

    pub fn load(&self) -> Result<ReferenceDataStore, PeervalError> {
        let (years, companies) = read_companies(&self.companies)?;
        let mut builder = ReferenceDataStore::builder(years.clone());
        for (line, record) in companies {
            if builder.contains_company(&record.ticker) {
                return Err(PeervalError::DataFormat {
                    file: self.companies.display().to_string(),
                    line,
                    reason: format!("duplicate ticker {}", record.ticker),
                });
            }
            builder.add_company(record)?;
        }

        for (code, series) in read_year_table(&self.median_pe, &years, normalize_code)? {
            builder.add_median_pe(SubIndustryCode::new(code), series);
        }
        for (ticker, series) in read_year_table(&self.actual_prices, &years, normalize_ticker)? {
            builder.add_actual_prices(ticker, series);
        }

        let store = builder.build();
        tracing::info!(
            first_year = *years.start(),
            last_year = *years.end(),
            "reference data loaded"
        );
        Ok(store)
    }
}

/// Spreadsheet exports often render integral codes as `45202030.0`.
fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(".0")
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(trimmed)
        .to_string()
}

fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

fn parse_cell(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    let value = s.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite());
    if value.is_none() {
        tracing::debug!(cell = s, "non-numeric cell treated as missing");
    }
    value
}

/// `2024`, `2024.0`, `eps_2024`, `Price 2024` → 2024 when prefixed as asked.
fn header_year(header: &str, prefix: &str) -> Option<i32> {
    let lower = header.trim().to_lowercase();
    let rest = lower.strip_prefix(prefix)?;
    let rest = rest.trim_start_matches(['_', ' ']);
    let rest = rest.strip_suffix(".0").unwrap_or(rest);
    if rest.len() == 4 && rest.chars().all(|c| c.is_ascii_digit()) {
        rest.parse().ok()
    } else {
        None
    }
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, PeervalError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PeervalError::DataLoad {
            reason: format!("failed to open {}: {}", path.display(), e),
        })
}

fn format_error(path: &Path, err: csv::Error) -> PeervalError {
    PeervalError::DataFormat {
        file: path.display().to_string(),
        line: err.position().map(|p| p.line()).unwrap_or(0),
        reason: err.to_string(),
    }
}

fn column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

type CompanyRows = (RangeInclusive<i32>, Vec<(u64, CompanyRecord)>);

fn read_companies(path: &Path) -> Result<CompanyRows, PeervalError> {
    let mut rdr = open(path)?;
    let headers = rdr.headers().map_err(|e| format_error(path, e))?.clone();
    let missing = |name: &str| PeervalError::DataFormat {
        file: path.display().to_string(),
        line: 1,
        reason: format!("missing {name} column"),
    };

    let ticker_col = column(&headers, &["ticker", "symbol"]).ok_or_else(|| missing("ticker"))?;
    let code_col =
        column(&headers, &["gsubind", "sub_industry"]).ok_or_else(|| missing("gsubind"))?;
    let sector_col = column(&headers, &["sector"]);
    let industry_col = column(&headers, &["industry"]);

    let eps_cols: BTreeMap<i32, usize> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| header_year(h, "eps").map(|y| (y, i)))
        .collect();
    let price_cols: BTreeMap<i32, usize> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| header_year(h, "price").map(|y| (y, i)))
        .collect();

    let first = eps_cols.keys().chain(price_cols.keys()).min().copied();
    let last = eps_cols.keys().chain(price_cols.keys()).max().copied();
    let (Some(first), Some(last)) = (first, last) else {
        return Err(missing("eps_<year> / price_<year>"));
    };
    let years = first..=last;
    if let Some(gap) = years
        .clone()
        .find(|y| !eps_cols.contains_key(y) && !price_cols.contains_key(y))
    {
        return Err(PeervalError::DataFormat {
            file: path.display().to_string(),
            line: 1,
            reason: format!("year columns are not contiguous, no eps or price column for {gap}"),
        });
    }

    let series = |record: &csv::StringRecord, cols: &BTreeMap<i32, usize>| {
        let values = years
            .clone()
            .map(|y| parse_cell(cols.get(&y).and_then(|&i| record.get(i))))
            .collect();
        AnnualSeries::new(first, values)
    };
    let text = |record: &csv::StringRecord, col: Option<usize>| {
        col.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| format_error(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let ticker = normalize_ticker(record.get(ticker_col).unwrap_or_default());
        if ticker.is_empty() {
            tracing::warn!(line, "skipping company row without ticker");
            continue;
        }
        let Some(code) = text(&record, Some(code_col)) else {
            tracing::warn!(line, ticker = %ticker, "skipping company row without sub-industry code");
            continue;
        };

        rows.push((
            line,
            CompanyRecord {
                ticker,
                sub_industry: SubIndustryCode::new(normalize_code(&code)),
                sector: text(&record, sector_col),
                industry: text(&record, industry_col),
                eps: series(&record, &eps_cols),
                prices: series(&record, &price_cols),
            },
        ));
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "companies read");
    Ok((years, rows))
}

/// Reads a `key, <YYYY>...` table. Year columns outside `years` are ignored.
/// Row keys go through `normalize_key`.
fn read_year_table(
    path: &Path,
    years: &RangeInclusive<i32>,
    normalize_key: fn(&str) -> String,
) -> Result<Vec<(String, AnnualSeries)>, PeervalError> {
    let mut rdr = open(path)?;
    let headers = rdr.headers().map_err(|e| format_error(path, e))?.clone();

    let mut year_cols = BTreeMap::new();
    for (i, h) in headers.iter().enumerate().skip(1) {
        match header_year(h, "") {
            Some(y) if years.contains(&y) => {
                year_cols.insert(y, i);
            }
            Some(y) => {
                tracing::warn!(path = %path.display(), year = y, "ignoring year outside company range")
            }
            None => {}
        }
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| format_error(path, e))?;
        let key = record.get(0).map(str::trim).unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        let values = years
            .clone()
            .map(|y| parse_cell(year_cols.get(&y).and_then(|&i| record.get(i))))
            .collect();
        rows.push((normalize_key(key), AnnualSeries::new(*years.start(), values)));
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "year table read");
    Ok(rows)
}
