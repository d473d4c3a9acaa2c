//! Retrying fetch primitive over an [`HttpClient`].
//!
//! A [`FetchClient`] owns one transport. Transient failures are retried with
//! fixed delays until the attempt budget runs out; everything that escapes is a
//! [`FetchError`] the caller must treat as fatal.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::retry::{RetryConfig, RetryReason};
use crate::FetchError;

const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Clone)]
pub struct FetchClient {
    http_client: Arc<dyn HttpClient>,
    retry: RetryConfig,
    root_url: String,
}

impl FetchClient {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryConfig, root_url: impl Into<String>) -> Self {
        Self {
            http_client,
            retry,
            root_url: root_url.into(),
        }
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Issues `request` until it succeeds or the attempt budget is spent.
    pub async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let url = request.full_url();
        let max_attempts = self.retry.max_attempts;
        let mut last_failure: Option<RetryReason> = None;

        for attempt in 1..=max_attempts {
            debug!(%url, attempt, "sending request");

            let reason = match self.http_client.execute(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => RetryReason::Status(response.status),
                Err(error) if error.retryable() => RetryReason::Transport(error.message().to_owned()),
                Err(source) => return Err(FetchError::Transport { url, source }),
            };

            if attempt < max_attempts {
                let delay = self.retry.delay_for(&reason);
                warn!(%url, attempt, max_attempts, reason = %reason, ?delay, "request failed, retrying");
                tokio::time::sleep(delay).await;
            }
            last_failure = Some(reason);
        }

        Err(FetchError::RetryExhausted {
            url,
            attempts: max_attempts,
            last_failure: last_failure
                .map(|reason| reason.to_string())
                .unwrap_or_default(),
        })
    }

    /// Requests the root page so the transport picks up session cookies.
    pub async fn warm_up(&self) -> Result<(), FetchError> {
        debug!(url = %self.root_url, "warming up session");
        self.fetch(HttpRequest::get(self.root_url.as_str())).await?;
        Ok(())
    }

    /// Fetches a body, re-warming the session once if the upstream marks it as an error page.
    pub async fn fetch_payload(&self, request: HttpRequest) -> Result<String, FetchError> {
        let response = self.fetch(request.clone()).await?;
        if !self.retry.is_error_payload(&response.body) {
            return Ok(response.body);
        }

        let url = request.full_url();
        warn!(%url, "upstream returned an error page, re-warming session");
        self.warm_up().await?;
        tokio::time::sleep(self.retry.rewarm_delay).await;

        let response = self.fetch(request).await?;
        if self.retry.is_error_payload(&response.body) {
            return Err(FetchError::UpstreamError { url });
        }
        Ok(response.body)
    }

    /// Fetches and decodes a JSON body.
    ///
    /// A body that is not JSON yields `Ok(None)`; the failure is logged, not returned.
    pub async fn fetch_json(&self, request: HttpRequest) -> Result<Option<Value>, FetchError> {
        let url = request.full_url();
        let body = self.fetch_payload(request).await?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                warn!(
                    %url,
                    %error,
                    body = %excerpt(&body),
                    "response is not valid JSON, treating as no data"
                );
                Ok(None)
            }
        }
    }
}

fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(BODY_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
