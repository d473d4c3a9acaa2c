//! Chunked, paced report acquisition across a fixed pool of workers.

use std::sync::Arc;
use std::time::Duration;

use time::Date;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::extract::Extractor;
use crate::fetch::FetchClient;
use crate::http_client::{ClientFactory, HttpRequest};
use crate::tasks::join_ordered;
use crate::{Category, FetchError, PipelineError, Report, ValidationError};

/// Splits `items` into exactly `chunks` contiguous slices.
///
/// The first `len % chunks` slices hold one extra element, so sizes differ by
/// at most one and never increase. Returns no slices when `chunks` is zero.
pub fn split<T>(items: &[T], chunks: usize) -> Vec<&[T]> {
    if chunks == 0 {
        return Vec::new();
    }

    let base = items.len() / chunks;
    let extra = items.len() % chunks;
    let mut start = 0;

    (0..chunks)
        .map(|index| {
            let size = base + usize::from(index < extra);
            let chunk = &items[start..start + size];
            start += size;
            chunk
        })
        .collect()
}

/// Formats the `date` query parameter of the report endpoint (`YYYYMMDD`).
pub fn report_date_param(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// One worker's fetch-and-extract pipeline.
#[derive(Clone)]
pub struct ReportFetcher {
    client: FetchClient,
    extractor: Arc<dyn Extractor>,
    report_url: String,
}

impl ReportFetcher {
    pub fn new(client: FetchClient, extractor: Arc<dyn Extractor>, report_url: impl Into<String>) -> Self {
        Self {
            client,
            extractor,
            report_url: report_url.into(),
        }
    }

    pub async fn warm_up(&self) -> Result<(), FetchError> {
        self.client.warm_up().await
    }

    /// Fetches one category's report. An undecodable payload yields an empty report.
    pub async fn fetch_report(&self, category: Category, as_of: Date) -> Result<Report, FetchError> {
        let request = HttpRequest::get(self.report_url.as_str())
            .with_query("date", report_date_param(as_of))
            .with_query("type", category.code.as_str())
            .with_query("response", "json");

        let payload = self.client.fetch_json(request).await?;
        let rows = self.extractor.extract_report_rows(payload.as_ref());
        debug!(code = %category.code, category = %category.name, rows = rows.len(), "fetched report");

        Ok(Report::new(category, rows))
    }

    /// Fetches `categories` one after another, pausing `pacing` between fetches.
    pub async fn fetch_all(
        &self,
        categories: Vec<Category>,
        as_of: Date,
        pacing: Duration,
    ) -> Result<Vec<Report>, FetchError> {
        let mut reports = Vec::with_capacity(categories.len());
        for (position, category) in categories.into_iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(pacing).await;
            }
            reports.push(self.fetch_report(category, as_of).await?);
        }
        Ok(reports)
    }
}

/// Fetches one report per category using `concurrency` independent workers.
pub struct ReportAggregator {
    client_factory: ClientFactory,
    extractor: Arc<dyn Extractor>,
    config: PipelineConfig,
}

impl ReportAggregator {
    pub fn new(
        client_factory: ClientFactory,
        extractor: Arc<dyn Extractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            client_factory,
            extractor,
            config,
        }
    }

    fn new_fetcher(&self) -> ReportFetcher {
        let client = FetchClient::new(
            (self.client_factory)(),
            self.config.retry.clone(),
            self.config.source.root_url.as_str(),
        );
        ReportFetcher::new(
            client,
            Arc::clone(&self.extractor),
            self.config.source.report_url.as_str(),
        )
    }

    /// Returns one report per category, in the order of `categories`.
    ///
    /// Any worker failure fails the whole call and cancels the other workers.
    pub async fn get_reports(
        &self,
        categories: &[Category],
        as_of: Date,
    ) -> Result<Vec<Report>, PipelineError> {
        let concurrency = self.config.concurrency;
        if concurrency == 0 {
            return Err(ValidationError::ZeroConcurrency.into());
        }

        let chunks = split(categories, concurrency);
        let fetchers: Vec<ReportFetcher> = (0..concurrency).map(|_| self.new_fetcher()).collect();
        info!(
            categories = categories.len(),
            workers = concurrency,
            sizes = ?chunks.iter().map(|chunk| chunk.len()).collect::<Vec<_>>(),
            "fetching reports"
        );

        let mut warm_ups = JoinSet::new();
        for (index, fetcher) in fetchers.iter().cloned().enumerate() {
            warm_ups.spawn(async move { (index, fetcher.warm_up().await) });
        }
        join_ordered(warm_ups, concurrency).await?;

        let pacing = self.config.pacing;
        let mut workers = JoinSet::new();
        for (index, (fetcher, chunk)) in fetchers.into_iter().zip(chunks).enumerate() {
            let chunk = chunk.to_vec();
            workers.spawn(async move { (index, fetcher.fetch_all(chunk, as_of, pacing).await) });
        }

        let reports: Vec<Report> = join_ordered(workers, concurrency)
            .await?
            .into_iter()
            .flatten()
            .collect();
        info!(reports = reports.len(), "all workers finished");
        Ok(reports)
    }
}
