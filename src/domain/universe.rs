//! Universe-wide summary figures.

use crate::domain::backtest::universe_hit_rate;
use crate::domain::hit_rate::HitRateStat;
use crate::domain::store::ReferenceDataStore;
use crate::ports::reference_data_port::ReferenceDataPort;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniverseSummary {
    pub tickers: usize,
    pub sub_industries: usize,
    pub first_year: i32,
    pub last_year: i32,
    pub years_of_history: usize,
    /// Present EPS cells plus present price cells.
    pub raw_data_points: usize,
    pub tickers_with_actual_prices: usize,
    /// Scored observations across both horizons.
    pub backtest_samples: HitRateStat,
}

impl UniverseSummary {
    pub fn compute(store: &ReferenceDataStore) -> Self {
        let years = store.years();
        let raw_data_points = store
            .companies()
            .iter()
            .map(|c| c.eps.present_count() + c.prices.present_count())
            .sum();
        let tickers_with_actual_prices = store
            .tickers()
            .iter()
            .filter(|t| store.has_actual_prices(t))
            .count();

        Self {
            tickers: store.tickers().len(),
            sub_industries: store.sub_industry_count(),
            first_year: *years.start(),
            last_year: *years.end(),
            years_of_history: years.count(),
            raw_data_points,
            tickers_with_actual_prices,
            backtest_samples: universe_hit_rate(store).combined(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::{AnnualSeries, CompanyRecord, SubIndustryCode};

    fn company(ticker: &str, code: &str, eps: Vec<Option<f64>>, prices: Vec<Option<f64>>) -> CompanyRecord {
        CompanyRecord {
            ticker: ticker.into(),
            sub_industry: SubIndustryCode::new(code),
            sector: Some("Tech".into()),
            industry: None,
            eps: AnnualSeries::new(2020, eps),
            prices: AnnualSeries::new(2020, prices),
        }
    }

    #[test]
    fn summary_counts() {
        let mut b = ReferenceDataStore::builder(2020..=2022);
        b.add_company(company(
            "AAA",
            "10",
            vec![Some(1.0), Some(1.0), Some(1.0)],
            vec![Some(10.0), None, Some(12.0)],
        ))
        .unwrap();
        b.add_company(company("BBB", "20", vec![None, None, Some(2.0)], vec![None, None, None]))
            .unwrap();
        b.add_median_pe(
            SubIndustryCode::new("10"),
            AnnualSeries::new(2020, vec![Some(12.0), Some(12.0), Some(12.0)]),
        );
        b.add_actual_prices(
            "AAA",
            AnnualSeries::new(2020, vec![Some(10.0), Some(11.0), Some(13.0)]),
        );
        let store = b.build();

        let summary = UniverseSummary::compute(&store);
        assert_eq!(summary.tickers, 2);
        assert_eq!(summary.sub_industries, 2);
        assert_eq!(summary.first_year, 2020);
        assert_eq!(summary.last_year, 2022);
        assert_eq!(summary.years_of_history, 3);
        assert_eq!(summary.raw_data_points, 3 + 2 + 1);
        assert_eq!(summary.tickers_with_actual_prices, 1);
        // model 12 > actual for 2020 and 2021 → Up each year.
        // 2020→2021 up, 2020→2022 up, 2021→2022 up: all hits.
        assert_eq!(summary.backtest_samples, HitRateStat::new(3, 3));
    }
}
