#![forbid(unsafe_code)]

//! # merge-bench
//!
//! Evaluation harness for benchmarking LLMs on merge-conflict-resolution tasks
//! across programming languages.
//!
//! The harness sends conflict-resolution prompts to remote (OpenRouter) or
//! locally hosted models, caches every response on disk keyed by a content hash
//! of the prompt, and scores the returned code against ground truth with a
//! layered reward: exact match, semantic match (comments and whitespace
//! stripped per-language), preserved conflict markers, or nothing.
//!
//! Repeated evaluation runs are cheap because the cache short-circuits the
//! network entirely: a prompt that has been answered once by a given model is
//! never sent again.

pub mod cache;
pub mod dataset;
pub mod eval;
pub mod extract;
pub mod gateway;
pub mod language;
pub mod model;
pub mod normalize;
pub mod prompts;
pub mod reward;

pub use cache::{CompletionRecord, ResponseCache};
pub use gateway::{
    ChatProvider, Completion, OpenRouterAdapter, QueryClient, QueryError, RetryPolicy,
};
pub use language::Language;
pub use model::{create_model, Inference, Model, ModelKind};
pub use reward::{code_markdown_reward, format_reward, merged_conflict_reward, RewardScore};
