//! Cached query client for remote completion providers.
//!
//! The client owns the fast path of every evaluation run: a cache hit returns
//! the prior [`CompletionRecord`] with no network traffic at all, so repeated
//! runs over the same dataset cost nothing after the first. Misses go to the
//! provider under a retry policy, and only fully-successful responses are
//! written back to the cache.

pub mod error;
pub mod openrouter;
pub mod retry;

use std::sync::Arc;

use tracing::info;

use crate::cache::{CompletionRecord, ResponseCache};

pub use error::QueryError;
pub use openrouter::{ChatProvider, Completion, OpenRouterAdapter};
pub use retry::{Retryable, RetryPolicy};

/// Write-through cached client over a [`ChatProvider`].
#[derive(Clone)]
pub struct QueryClient {
    cache: ResponseCache,
    provider: Arc<dyn ChatProvider>,
    policy: RetryPolicy,
}

impl QueryClient {
    pub fn new(cache: ResponseCache, provider: Arc<dyn ChatProvider>) -> Self {
        Self::with_policy(cache, provider, RetryPolicy::standard())
    }

    pub fn with_policy(
        cache: ResponseCache,
        provider: Arc<dyn ChatProvider>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            cache,
            provider,
            policy,
        }
    }

    /// Construct against the public OpenRouter endpoint with credentials from
    /// the environment. Fails fast on missing credentials.
    pub fn from_env(cache: ResponseCache) -> Result<Self, QueryError> {
        let adapter = OpenRouterAdapter::from_env()?;
        Ok(Self::new(cache, Arc::new(adapter)))
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Query the provider for a completion, reading through the cache.
    ///
    /// Cache hits return immediately. On a miss the provider is called under
    /// the client's retry policy; a response lacking the primary content field
    /// counts as a failure and is retried, never cached. The successful record
    /// is persisted before being returned.
    pub async fn query(
        &self,
        prompt: &str,
        model_name: &str,
    ) -> Result<CompletionRecord, QueryError> {
        if let Some(cached) = self.cache.get(model_name, prompt)? {
            info!(model = model_name, "using cached response");
            return Ok(cached);
        }

        let completion = self
            .policy
            .run(|| self.provider.complete(model_name, prompt))
            .await?;

        let record = CompletionRecord {
            prompt: prompt.to_owned(),
            result: completion.result,
            reasoning: completion.reasoning,
        };
        self.cache.put(model_name, prompt, &record)?;
        Ok(record)
    }
}
