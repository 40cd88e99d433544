//! Peer group resolution by sub-industry code.

use crate::domain::company::SubIndustryCode;
use crate::domain::error::PeervalError;
use crate::ports::reference_data_port::ReferenceDataPort;
use serde::Serialize;

/// All tickers sharing the subject's sub-industry code, subject included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerGroup {
    pub subject: String,
    pub sub_industry: SubIndustryCode,
    pub members: Vec<String>,
}

impl PeerGroup {
    /// Members other than the subject, in store order.
    pub fn competitors(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .map(String::as_str)
            .filter(move |t| *t != self.subject)
    }

    pub fn competitor_count(&self) -> usize {
        self.competitors().count()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.members.iter().any(|m| m == ticker)
    }
}

pub fn resolve(store: &dyn ReferenceDataPort, ticker: &str) -> Result<PeerGroup, PeervalError> {
    let company = store
        .company(ticker)
        .ok_or_else(|| PeervalError::not_found(ticker))?;
    let code = company.sub_industry.clone();

    let members: Vec<String> = store
        .tickers()
        .iter()
        .filter(|t| {
            store
                .company(t)
                .is_some_and(|c| c.sub_industry == code)
        })
        .cloned()
        .collect();

    tracing::debug!(ticker, sub_industry = %code, members = members.len(), "resolved peer group");

    Ok(PeerGroup {
        subject: company.ticker.clone(),
        sub_industry: code,
        members,
    })
}
