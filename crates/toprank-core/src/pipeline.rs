//! End-to-end run: listings, categories, reports, ranking, persistence.

use std::sync::Arc;

use serde::Serialize;
use time::Date;
use tracing::info;

use crate::aggregator::ReportAggregator;
use crate::config::{Destination, PipelineConfig};
use crate::extract::{Extractor, TwseExtractor};
use crate::fetch::FetchClient;
use crate::http_client::{ClientFactory, HttpRequest, ReqwestHttpClient};
use crate::ranking::RankingEngine;
use crate::store::{store_for, Artifact, ArtifactStore};
use crate::{Category, Listing, PipelineError, TopNResult};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    #[serde(with = "iso_date")]
    pub as_of: Date,
    pub listings: usize,
    pub categories: usize,
    pub results: Vec<TopNResult>,
}

pub struct Pipeline {
    config: PipelineConfig,
    client_factory: ClientFactory,
    extractor: Arc<dyn Extractor>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        client_factory: ClientFactory,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        Self {
            config,
            client_factory,
            extractor,
        }
    }

    /// Pipeline against the live exchange with reqwest transports.
    pub fn twse(config: PipelineConfig) -> Self {
        let client_factory = ReqwestHttpClient::factory(
            config.source.user_agent.as_str(),
            config.source.request_timeout,
        );
        let extractor = Arc::new(TwseExtractor::new(config.categories.clone()));
        Self::new(config, client_factory, extractor)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn session(&self) -> FetchClient {
        FetchClient::new(
            (self.client_factory)(),
            self.config.retry.clone(),
            self.config.source.root_url.as_str(),
        )
    }

    pub async fn get_listings(&self, session: &FetchClient) -> Result<Vec<Listing>, PipelineError> {
        let request = HttpRequest::get(self.config.source.listings_url.as_str())
            .with_charset(self.config.source.listings_charset.as_str());
        let payload = session.fetch_payload(request).await?;
        Ok(self.extractor.extract_listings(&payload)?)
    }

    pub async fn get_categories(&self, session: &FetchClient) -> Result<Vec<Category>, PipelineError> {
        let request = HttpRequest::get(self.config.source.categories_url.as_str());
        let payload = session.fetch_payload(request).await?;
        Ok(self.extractor.extract_categories(&payload)?)
    }

    /// Runs the pipeline and persists into `destination`.
    pub async fn run(&self, as_of: Date, destination: Destination) -> Result<RunSummary, PipelineError> {
        let store = store_for(destination, &self.config.store, (self.client_factory)())?;
        self.run_with_store(as_of, store.as_ref()).await
    }

    /// Runs the pipeline, persisting through `store`.
    ///
    /// The listings snapshot is stored before any report is fetched, so it
    /// survives a later fatal error.
    pub async fn run_with_store(
        &self,
        as_of: Date,
        store: &dyn ArtifactStore,
    ) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;

        let session = self.session();
        session.warm_up().await?;
        tokio::time::sleep(self.config.warm_up_settle).await;

        let listings = self.get_listings(&session).await?;
        info!(count = listings.len(), "listings acquired");
        store.store(&Artifact::listings(&listings)?).await?;
        tokio::time::sleep(self.config.settle_delay).await;

        let categories = self.get_categories(&session).await?;
        info!(count = categories.len(), "categories acquired");
        tokio::time::sleep(self.config.settle_delay).await;

        let aggregator = ReportAggregator::new(
            Arc::clone(&self.client_factory),
            Arc::clone(&self.extractor),
            self.config.clone(),
        );
        let reports = aggregator.get_reports(&categories, as_of).await?;

        let engine = RankingEngine::new(self.config.top_n, self.config.rank_concurrency);
        let results = engine.calculate_top_n(reports, &listings).await?;

        for result in &results {
            store.store(&Artifact::top_n(result)?).await?;
        }
        info!(categories = results.len(), %as_of, "rankings stored");

        Ok(RunSummary {
            as_of,
            listings: listings.len(),
            categories: categories.len(),
            results,
        })
    }
}
