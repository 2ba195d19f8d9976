//! Model abstraction: remote API models and locally hosted models behind one
//! `inference` interface.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::ResponseCache;
use crate::gateway::{OpenRouterAdapter, QueryClient, QueryError, RetryPolicy};

/// Prefixes identifying models served through the remote API. Anything else
/// is assumed to be locally hosted.
pub const REMOTE_MODEL_PREFIXES: &[&str] = &[
    "api/",
    "openai/",
    "anthropic/",
    "qwen/",
    "meta/",
    "google/",
    "x-ai/",
    "deepseek/",
    "o3",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Remote,
    Local,
}

impl ModelKind {
    /// Pure classification of a model identifier by prefix.
    pub fn classify(model_name: &str) -> ModelKind {
        if REMOTE_MODEL_PREFIXES
            .iter()
            .any(|prefix| model_name.starts_with(prefix))
        {
            ModelKind::Remote
        } else {
            ModelKind::Local
        }
    }
}

/// Single-operation interface every model variant exposes.
#[async_trait]
pub trait Inference: Send + Sync {
    /// Generate a completion for the prompt. Recoverable failures (network,
    /// provider) propagate to the caller; configuration problems surface at
    /// construction time instead.
    async fn inference(&self, prompt: &str) -> Result<String, QueryError>;
}

/// Models routed through the managed `api/` alias sit behind an upstream that
/// sheds load for minutes at a time; those get the persistent outer policy on
/// top of the client's per-request retries.
pub fn uses_persistent_retry(model_name: &str) -> bool {
    model_name.starts_with("api/")
}

/// API-backed model routed through the cached query client.
pub struct RemoteModel {
    name: String,
    client: QueryClient,
    outer_policy: Option<RetryPolicy>,
}

impl RemoteModel {
    pub fn new(name: impl Into<String>, client: QueryClient) -> Self {
        Self {
            name: name.into(),
            client,
            outer_policy: None,
        }
    }

    /// Wrap every query in an outer retry schedule. The whole cached query is
    /// re-entered after the client's own policy gives up, so a later attempt
    /// still benefits from anything cached in between.
    pub fn with_outer_policy(mut self, policy: RetryPolicy) -> Self {
        self.outer_policy = Some(policy);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Inference for RemoteModel {
    async fn inference(&self, prompt: &str) -> Result<String, QueryError> {
        let record = match self.outer_policy {
            Some(policy) => {
                policy
                    .run(|| self.client.query(prompt, &self.name))
                    .await?
            }
            None => self.client.query(prompt, &self.name).await?,
        };
        let reasoning = record.reasoning.as_deref().unwrap_or("No reasoning found");
        // Re-assemble the think/answer shape the reward functions expect.
        Ok(format!("<think>\n{reasoning}</think>\n{}", record.result))
    }
}

/// Locally hosted model behind an OpenAI-compatible inference server.
///
/// Thin wrapper: generation itself happens in the external runtime. The
/// server typically holds a single exclusively-owned model handle, so
/// concurrent evaluation against a local model should serialize calls to one
/// worker; this is a documented constraint, not enforced here.
pub struct LocalModel {
    name: String,
    adapter: OpenRouterAdapter,
    policy: RetryPolicy,
}

impl LocalModel {
    /// Connect to the server named by `MERGE_BENCH_LOCAL_URL`. Absence of the
    /// variable is a fatal configuration error.
    pub fn from_env(name: impl Into<String>) -> Result<Self, QueryError> {
        let base_url = std::env::var("MERGE_BENCH_LOCAL_URL")
            .map_err(|_| QueryError::config("MERGE_BENCH_LOCAL_URL not set"))?;
        Self::with_base_url(name, base_url)
    }

    pub fn with_base_url(
        name: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, QueryError> {
        // Local servers do not check the bearer token.
        let adapter =
            OpenRouterAdapter::with_config("local", base_url, Duration::from_secs(600))?;
        Ok(Self {
            name: name.into(),
            adapter,
            policy: RetryPolicy::standard(),
        })
    }
}

#[async_trait]
impl Inference for LocalModel {
    async fn inference(&self, prompt: &str) -> Result<String, QueryError> {
        use crate::gateway::ChatProvider;
        let completion = self
            .policy
            .run(|| self.adapter.complete(&self.name, prompt))
            .await?;
        // Local checkpoints emit their own think-tags inline; pass through.
        Ok(completion.result)
    }
}

/// Tagged union over the two model variants.
pub enum Model {
    Remote(RemoteModel),
    Local(LocalModel),
}

#[async_trait]
impl Inference for Model {
    async fn inference(&self, prompt: &str) -> Result<String, QueryError> {
        match self {
            Model::Remote(m) => m.inference(prompt).await,
            Model::Local(m) => m.inference(prompt).await,
        }
    }
}

/// Map a model identifier to the right variant. Remote models share the given
/// cache; credentials come from the environment, and their absence aborts
/// here, before any work is attempted.
pub fn create_model(model_name: &str, cache: ResponseCache) -> Result<Model, QueryError> {
    match ModelKind::classify(model_name) {
        ModelKind::Remote => {
            let client = QueryClient::from_env(cache)?;
            let mut model = RemoteModel::new(model_name, client);
            if uses_persistent_retry(model_name) {
                model = model.with_outer_policy(RetryPolicy::persistent());
            }
            Ok(Model::Remote(model))
        }
        ModelKind::Local => Ok(Model::Local(LocalModel::from_env(model_name)?)),
    }
}
