//! Per-category top-N ranking of upward movers.
//!
//! Rows are joined against the tickers the listings registry places in the
//! report's category (the "scope"), scored by their percentage gain over the
//! prior close, and truncated to the best `top_n`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::tasks::join_ordered;
use crate::{
    Listing, PipelineError, RankedEntry, Report, ReportRow, Ticker, TopNResult, ValidationError,
};

/// Tickers per category display name.
pub type Scope = HashMap<String, HashSet<Ticker>>;

pub fn build_scope(listings: &[Listing]) -> Scope {
    let mut scope = Scope::new();
    for listing in listings {
        scope
            .entry(listing.category.clone())
            .or_default()
            .insert(listing.ticker.clone());
    }
    scope
}

/// Gain relative to the prior close (`price - change`), in percent.
pub fn percentage_change(row: &ReportRow) -> Result<f64, ValidationError> {
    let price = row.last_price()?;
    let change = row.absolute_change()?;
    let percentage = change / (price - change) * 100.0;

    if !percentage.is_finite() {
        return Err(ValidationError::NonFinitePercentage {
            ticker: row.ticker.to_string(),
        });
    }
    Ok(percentage)
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

/// Ranks one report against the tickers in its category.
///
/// Entries are ordered by the formatted percentage text, descending. That is
/// a text comparison: `"9.50%"` sorts above `"10.00%"`.
pub fn rank_report(report: &Report, scope: Option<&HashSet<Ticker>>, top_n: usize) -> TopNResult {
    let mut entries: Vec<RankedEntry> = report
        .rows
        .iter()
        .filter(|row| row.goes_up && scope.is_some_and(|tickers| tickers.contains(&row.ticker)))
        .filter_map(|row| match percentage_change(row) {
            Ok(value) => Some(RankedEntry {
                ticker: row.ticker.clone(),
                percentage: format_percentage(value),
            }),
            Err(error) => {
                warn!(ticker = %row.ticker, %error, "cannot score row, skipping");
                None
            }
        })
        .collect();

    entries.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    entries.truncate(top_n);

    TopNResult {
        category: report.category.name.clone(),
        entries,
    }
}

/// Ranks many reports concurrently with a bounded number of tasks in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingEngine {
    top_n: usize,
    concurrency: usize,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(3, 8)
    }
}

impl RankingEngine {
    pub fn new(top_n: usize, concurrency: usize) -> Self {
        Self { top_n, concurrency }
    }

    /// One result per report, in report order.
    pub async fn calculate_top_n(
        &self,
        reports: Vec<Report>,
        listings: &[Listing],
    ) -> Result<Vec<TopNResult>, PipelineError> {
        if self.concurrency == 0 {
            return Err(ValidationError::ZeroConcurrency.into());
        }

        let scope = Arc::new(build_scope(listings));
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let top_n = self.top_n;
        let len = reports.len();

        let mut tasks = JoinSet::new();
        for (index, report) in reports.into_iter().enumerate() {
            let scope = Arc::clone(&scope);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => Ok(rank_report(&report, scope.get(&report.category.name), top_n)),
                    Err(error) => Err(PipelineError::TaskFailed(error.to_string())),
                };
                (index, result)
            });
        }

        let results = join_ordered(tasks, len).await?;
        debug!(categories = results.len(), "ranking finished");
        Ok(results)
    }
}
