//! Error taxonomy for the query client.

use thiserror::Error;

use crate::gateway::retry::Retryable;

/// Errors from querying a completion provider.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Missing credentials or an unusable client setup. Fatal: raised before
    /// any work is attempted and never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP/network error from the underlying client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error surfaced by the provider itself (non-2xx status, error body,
    /// unparseable response).
    #[error("{provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
        retryable: bool,
    },

    /// Response parsed but the primary content field is absent. Treated like a
    /// transient failure: retried, and never cached.
    #[error("response missing content field")]
    MissingContent,

    /// Failure persisting a successful response. Previously-written entries
    /// are unaffected (writes go through rename, never in place).
    #[error("cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),
}

impl QueryError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn provider(provider: &'static str, message: impl Into<String>, retryable: bool) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
            retryable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            Self::Provider { retryable, .. } => *retryable,
            Self::MissingContent => true,
            Self::Cache(_) => false,
        }
    }
}

impl Retryable for QueryError {
    fn is_retryable(&self) -> bool {
        QueryError::is_retryable(self)
    }
}
