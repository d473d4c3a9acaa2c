//! Persistence of run artifacts to a local directory or a remote object store.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::config::{Destination, StoreConfig};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{Listing, StoreError, TopNResult, ValidationError};

pub const LISTINGS_KEY: &str = "listed.json";

/// A named JSON document produced by a run, already rendered.
///
/// Rendering happens from the typed value, so object keys keep their field
/// order (`ticker`, `name`, `listed_at`, `industry`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub key: String,
    pub body: String,
}

impl Artifact {
    /// Four-space indented JSON; non-ASCII text is written verbatim.
    pub fn from_serializable<T>(key: impl Into<String>, value: &T) -> Result<Self, StoreError>
    where
        T: Serialize + ?Sized,
    {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        value.serialize(&mut serializer)?;

        Ok(Self {
            key: key.into(),
            // serde_json only ever emits UTF-8.
            body: String::from_utf8_lossy(&buffer).into_owned(),
        })
    }

    /// Snapshot of every listing, stored as `listed.json`.
    pub fn listings(listings: &[Listing]) -> Result<Self, StoreError> {
        Self::from_serializable(LISTINGS_KEY, listings)
    }

    /// One category's ranking, stored as `<category>_top3.json` holding the entry list.
    pub fn top_n(result: &TopNResult) -> Result<Self, StoreError> {
        Self::from_serializable(format!("{}_top3.json", result.category), &result.entries)
    }
}

/// Sink for run artifacts.
pub trait ArtifactStore: Send + Sync {
    fn store<'a>(
        &'a self,
        artifact: &'a Artifact,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;
}

/// Writes artifacts as files under a directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl ArtifactStore for LocalStore {
    fn store<'a>(
        &'a self,
        artifact: &'a Artifact,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .map_err(|source| StoreError::Io {
                    path: self.dir.display().to_string(),
                    source,
                })?;

            let path = self.path_for(&artifact.key);
            tokio::fs::write(&path, artifact.body.as_bytes())
                .await
                .map_err(|source| StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })?;

            info!(path = %path.display(), "stored artifact");
            Ok(())
        })
    }
}

/// Uploads artifacts with `PUT <endpoint>/<bucket>/<key>`.
///
/// Requests are not signed; the endpoint must already authorize the caller.
#[derive(Clone)]
pub struct RemoteStore {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    bucket: String,
}

impl RemoteStore {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
        }
    }

    pub fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            urlencoding::encode(key)
        )
    }
}

impl ArtifactStore for RemoteStore {
    fn store<'a>(
        &'a self,
        artifact: &'a Artifact,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.url_for(&artifact.key);
            let request = HttpRequest::put(url.as_str())
                .with_header("content-type", "application/json")
                .with_body(artifact.body.clone());

            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|source| StoreError::RemoteTransport {
                    key: artifact.key.clone(),
                    source,
                })?;

            if !response.is_success() {
                return Err(StoreError::Remote {
                    key: artifact.key.clone(),
                    status: response.status,
                });
            }

            info!(%url, "uploaded artifact");
            Ok(())
        })
    }
}

/// Builds the store for a destination.
pub fn store_for(
    destination: Destination,
    config: &StoreConfig,
    http_client: Arc<dyn HttpClient>,
) -> Result<Arc<dyn ArtifactStore>, ValidationError> {
    match destination {
        Destination::Local => Ok(Arc::new(LocalStore::new(config.local_dir.clone()))),
        Destination::Remote => {
            let endpoint = config
                .remote_endpoint
                .as_deref()
                .filter(|endpoint| !endpoint.trim().is_empty())
                .ok_or(ValidationError::MissingRemoteEndpoint)?;
            Ok(Arc::new(RemoteStore::new(
                http_client,
                endpoint,
                config.bucket.as_str(),
            )))
        }
    }
}
