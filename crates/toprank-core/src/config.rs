use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::{RetryConfig, ValidationError};

/// Upstream endpoints and transport settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Known-good page used to warm up a session.
    pub root_url: String,
    pub listings_url: String,
    pub categories_url: String,
    pub report_url: String,
    /// The registry page is served in a Big5 code page without declaring it.
    pub listings_charset: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::with_base("https://www.twse.com.tw", "https://isin.twse.com.tw")
    }
}

impl SourceConfig {
    /// Points every endpoint at the given hosts, keeping the upstream paths.
    pub fn with_base(exchange_base: &str, registry_base: &str) -> Self {
        let exchange_base = exchange_base.trim_end_matches('/');
        let registry_base = registry_base.trim_end_matches('/');
        Self {
            root_url: format!("{exchange_base}/zh/"),
            listings_url: format!("{registry_base}/isin/C_public.jsp?strMode=2"),
            categories_url: format!("{exchange_base}/zh/page/trading/exchange/MI_INDEX.html"),
            report_url: format!("{exchange_base}/exchangeReport/MI_INDEX"),
            listings_charset: String::from("big5"),
            request_timeout: Duration::from_secs(30),
            user_agent: String::from(concat!("toprank/", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// Normalization rules that reconcile category names between the listings
/// registry and the report endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRules {
    /// Every display name ends with this suffix.
    pub suffix: String,
    /// Category codes the report endpoint does not support.
    pub excluded_codes: BTreeSet<String>,
    /// Real categories have codes of exactly this many ASCII digits.
    pub code_digits: usize,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            suffix: String::from("業"),
            excluded_codes: ["07", "13", "19"].into_iter().map(String::from).collect(),
            code_digits: 2,
        }
    }
}

impl CategoryRules {
    pub fn normalize_name(&self, raw: &str) -> String {
        let name = raw.trim();
        if name.ends_with(self.suffix.as_str()) {
            name.to_owned()
        } else {
            format!("{name}{}", self.suffix)
        }
    }

    /// Whether an option code names a supported category.
    pub fn accepts_code(&self, code: &str) -> bool {
        code.len() == self.code_digits
            && code.chars().all(|ch| ch.is_ascii_digit())
            && !self.excluded_codes.contains(code)
    }
}

/// Where persisted artifacts go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    #[default]
    Local,
    Remote,
}

impl Destination {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Destination {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" | "cloud" => Ok(Self::Remote),
            other => Err(ValidationError::InvalidDestination {
                value: other.to_owned(),
            }),
        }
    }
}

/// Persistence targets for both destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub local_dir: PathBuf,
    /// Base URL accepting pre-authorized `PUT`s (a signing gateway or a
    /// bucket that grants write access to the caller). There is no default:
    /// the remote destination needs one configured.
    pub remote_endpoint: Option<String>,
    pub bucket: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from("data"),
            remote_endpoint: None,
            bucket: String::from("stock-data-demo"),
        }
    }
}

/// Everything a pipeline run needs besides the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub retry: RetryConfig,
    pub categories: CategoryRules,
    pub store: StoreConfig,
    /// Number of report workers.
    pub concurrency: usize,
    /// Pause between two report fetches of the same worker.
    pub pacing: Duration,
    /// Upper bound on concurrently evaluated ranking tasks.
    pub rank_concurrency: usize,
    /// Pause after warming up the session before the first real fetch.
    pub warm_up_settle: Duration,
    /// Pause between pipeline phases.
    pub settle_delay: Duration,
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            retry: RetryConfig::default(),
            categories: CategoryRules::default(),
            store: StoreConfig::default(),
            concurrency: 2,
            pacing: Duration::from_secs(5),
            rank_concurrency: 8,
            warm_up_settle: Duration::from_secs(1),
            settle_delay: Duration::from_secs(2),
            top_n: 3,
        }
    }
}

impl PipelineConfig {
    /// Default settings with every delay removed; used by tests and dry runs.
    pub fn without_delays() -> Self {
        Self {
            retry: RetryConfig::immediate(RetryConfig::default().max_attempts),
            pacing: Duration::ZERO,
            warm_up_settle: Duration::ZERO,
            settle_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: SourceConfig) -> Self {
        self.source = source;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.concurrency == 0 || self.rank_concurrency == 0 {
            return Err(ValidationError::ZeroConcurrency);
        }
        self.retry.validate()
    }
}
