//! # Toprank Core
//!
//! Acquisition and ranking pipeline for daily exchange reports.
//!
//! ## Overview
//!
//! - **Fetch client** with a fixed retry budget and session warm-up
//! - **Extractor** turning registry pages and report JSON into typed records
//! - **Report aggregator** spreading categories over a fixed worker pool while
//!   keeping category order
//! - **Ranking engine** selecting the top upward movers per category
//! - **Artifact stores** for local files or a remote object store
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aggregator`] | Chunking and concurrent, paced report fetching |
//! | [`config`] | Endpoints, category rules, pipeline and store settings |
//! | [`domain`] | Listings, categories, reports and ranking results |
//! | [`error`] | Error types |
//! | [`extract`] | Extractor trait and the exchange's page/JSON extractor |
//! | [`fetch`] | Retrying fetch client |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`pipeline`] | End-to-end run |
//! | [`ranking`] | Scope join, percentage metric, top-N selection |
//! | [`retry`] | Retry budget and delays |
//! | [`store`] | Artifact persistence |
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Pipeline   │──────────────────────────────┐
//! └──────┬───────┘                              │
//!        │                                      ▼
//!        ▼                             ┌──────────────────┐
//! ┌──────────────┐   one per worker    │  Ranking Engine  │
//! │  Aggregator  │──────────┐          └────────┬─────────┘
//! └──────────────┘          ▼                   ▼
//!                   ┌──────────────┐   ┌──────────────────┐
//!                   │ Fetch Client │   │  Artifact Store  │
//!                   │ + Extractor  │   │ (local / remote) │
//!                   └──────┬───────┘   └──────────────────┘
//!                          ▼
//!                   ┌──────────────┐
//!                   │ HTTP Client  │
//!                   └──────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Transient network failures and rejected statuses are retried inside the
//! fetch client. A spent retry budget surfaces as [`FetchError`] and aborts the
//! run. Undecodable report payloads degrade to empty reports.
//!
//! ```rust
//! use toprank_core::{FetchError, PipelineError};
//!
//! fn describe(error: &PipelineError) -> &'static str {
//!     match error {
//!         PipelineError::Fetch(FetchError::RetryExhausted { .. }) => "upstream unavailable",
//!         PipelineError::Fetch(_) => "upstream rejected the session",
//!         PipelineError::Store(_) => "could not persist results",
//!         _ => "run failed",
//!     }
//! }
//! ```

pub mod aggregator;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod http_client;
pub mod pipeline;
pub mod ranking;
pub mod retry;
pub mod store;
mod tasks;

pub use aggregator::{report_date_param, split, ReportAggregator, ReportFetcher};
pub use config::{CategoryRules, Destination, PipelineConfig, SourceConfig, StoreConfig};
pub use domain::{
    parse_decimal, Category, Listing, ListingDate, RankedEntry, Report, ReportRow, Ticker,
    TopNResult,
};
pub use error::{ExtractError, FetchError, PipelineError, StoreError, ValidationError};
pub use extract::{Extractor, TwseExtractor};
pub use fetch::FetchClient;
pub use http_client::{
    ClientFactory, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};
pub use pipeline::{Pipeline, RunSummary};
pub use ranking::{build_scope, format_percentage, percentage_change, rank_report, RankingEngine, Scope};
pub use retry::{RetryConfig, RetryReason};
pub use store::{store_for, Artifact, ArtifactStore, LocalStore, RemoteStore, LISTINGS_KEY};
