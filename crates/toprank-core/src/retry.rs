//! Retry budget and fixed backoff delays for the fetch client.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::ValidationError;

/// Why an attempt did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    /// Connection, read or timeout failure.
    Transport(String),
    /// The upstream answered with a non-success status.
    Status(u16),
}

impl Display for RetryReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Status(status) => write!(f, "upstream returned status {status}"),
        }
    }
}

/// Configuration for the automatic retry mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts per logical fetch, the first one included.
    pub max_attempts: u32,
    /// Delay after a connection or read level failure.
    pub transport_delay: Duration,
    /// Delay after a non-success status code.
    pub status_delay: Duration,
    /// Pause between re-warming the session and repeating a marked fetch.
    pub rewarm_delay: Duration,
    /// Text the upstream embeds in a payload when it rejects the session.
    pub error_marker: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            transport_delay: Duration::from_secs(5),
            status_delay: Duration::from_secs(10),
            rewarm_delay: Duration::from_secs(1),
            error_marker: String::from("Error Code"),
        }
    }
}

impl RetryConfig {
    /// Same budget and marker as the default, with every delay set to zero.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            transport_delay: Duration::ZERO,
            status_delay: Duration::ZERO,
            rewarm_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::ZeroAttempts);
        }
        Ok(())
    }

    /// Delay to wait before the next attempt.
    pub fn delay_for(&self, reason: &RetryReason) -> Duration {
        match reason {
            RetryReason::Transport(_) => self.transport_delay,
            RetryReason::Status(_) => self.status_delay,
        }
    }

    pub fn is_error_payload(&self, body: &str) -> bool {
        !self.error_marker.is_empty() && body.contains(&self.error_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_config() {
        let config = RetryConfig::default();

        assert_eq!(config.max_attempts, 8);
        assert_eq!(config.transport_delay, Duration::from_secs(5));
        assert_eq!(config.status_delay, Duration::from_secs(10));
        assert_eq!(config.rewarm_delay, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_status_failures_wait_longer_than_transport_failures() {
        let config = RetryConfig::default();

        let transport = config.delay_for(&RetryReason::Transport(String::from("reset")));
        let status = config.delay_for(&RetryReason::Status(503));
        assert!(status > transport);
    }

    #[test]
    fn test_immediate_keeps_budget_and_drops_delays() {
        let config = RetryConfig::immediate(3);

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.delay_for(&RetryReason::Status(500)), Duration::ZERO);
        assert_eq!(config.error_marker, "Error Code");
    }

    #[test]
    fn test_zero_attempts_is_rejected() {
        let err = RetryConfig::immediate(0).validate().expect_err("must fail");
        assert_eq!(err, ValidationError::ZeroAttempts);
    }

    #[test]
    fn test_error_marker_detection() {
        let config = RetryConfig::default();

        assert!(config.is_error_payload("<html>Error Code: 403</html>"));
        assert!(!config.is_error_payload("<html>ok</html>"));

        let disabled = RetryConfig {
            error_marker: String::new(),
            ..RetryConfig::default()
        };
        assert!(!disabled.is_error_payload("Error Code"));
    }
}
