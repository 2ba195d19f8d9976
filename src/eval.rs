//! Evaluation driver: generate completions, score them, aggregate metrics.
//!
//! Runs in two phases. Generation fans out over the dataset with bounded
//! concurrency; each example owns a uniquely-named output slot keyed by its
//! index, so workers never contend and completion order does not matter.
//! Scoring then walks the dataset in original order, reads each slot, and
//! applies the reward functions. A per-example failure costs one slot, never
//! the run.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::ConflictExample;
use crate::language::Language;
use crate::model::Inference;
use crate::reward::{code_markdown_reward, format_reward, merged_conflict_reward, RewardScore};

#[derive(Debug, Clone)]
pub struct EvalOptions {
    pub model_name: String,
    pub language: Language,
    /// Dataset the examples were loaded from, as shown in the report.
    pub dataset: String,
    /// Dataset split name (e.g. "test").
    pub split: String,
    /// Directory holding per-example output slots and the results summary.
    pub output_dir: PathBuf,
    /// Bound on concurrent in-flight model calls.
    pub max_workers: usize,
    /// Evaluate only the first N examples when set.
    pub max_samples: Option<usize>,
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Externally visible result of a full run: percentage metrics over the
/// successfully scored examples.
#[derive(Debug, Clone, Serialize)]
pub struct EvalSummary {
    pub model_name: String,
    pub language: Language,
    pub dataset: String,
    pub split: String,
    pub total: usize,
    pub pct_thinking: f64,
    pub pct_code_markdown: f64,
    pub pct_conflict_preserved: f64,
    pub pct_semantic: f64,
    pub pct_exact: f64,
}

impl EvalSummary {
    pub fn render(&self) -> String {
        format!(
            "Model: {}\n\
             Language: {}\n\
             Dataset: {}\n\
             Split: {}\n\
             Total merges evaluated: {}\n\
             Percentage with valid thinking format: {:.2}%\n\
             Percentage with valid {} markdown format: {:.2}%\n\
             Percentage correctly raising merge conflict: {:.2}%\n\
             Percentage semantically correctly resolved merges: {:.2}%\n\
             Percentage correctly resolved merges: {:.2}%\n",
            self.model_name,
            self.language,
            self.dataset,
            self.split,
            self.total,
            self.pct_thinking,
            self.language,
            self.pct_code_markdown,
            self.pct_conflict_preserved,
            self.pct_semantic,
            self.pct_exact,
        )
    }
}

/// Output slot for one example.
pub fn slot_path(output_dir: &Path, idx: usize) -> PathBuf {
    output_dir.join(format!("example_{idx}.txt"))
}

/// Run generation and scoring over a dataset, writing per-example outputs and
/// a `results.txt` summary under the output directory.
pub async fn run_eval(
    model: &dyn Inference,
    dataset: &[ConflictExample],
    opts: &EvalOptions,
) -> Result<EvalSummary, EvalError> {
    std::fs::create_dir_all(&opts.output_dir)?;

    let limit = opts.max_samples.unwrap_or(dataset.len()).min(dataset.len());
    let dataset = &dataset[..limit];
    info!(
        model = %opts.model_name,
        language = %opts.language,
        examples = dataset.len(),
        "starting evaluation"
    );

    generate_completions(model, dataset, opts).await;
    let summary = score_completions(dataset, opts);

    std::fs::write(
        opts.output_dir.join("results.txt"),
        summary.render(),
    )?;
    Ok(summary)
}

/// Fan generation out over the dataset. Slots that already exist are kept,
/// which is what makes interrupted runs resumable: the cache plus the slot
/// check together mean finished work is never redone.
async fn generate_completions(
    model: &dyn Inference,
    dataset: &[ConflictExample],
    opts: &EvalOptions,
) {
    let tasks = dataset.iter().enumerate().map(|(idx, example)| {
        let path = slot_path(&opts.output_dir, idx);
        async move {
            if path.exists() {
                return;
            }
            match model.inference(&example.question).await {
                Ok(completion) => {
                    if let Err(e) = std::fs::write(&path, completion) {
                        warn!(idx, error = %e, "failed to write output slot");
                    }
                }
                Err(e) => {
                    warn!(idx, error = %e, "inference failed, example will be skipped");
                }
            }
        }
    });

    stream::iter(tasks)
        .buffer_unordered(opts.max_workers.max(1))
        .collect::<Vec<()>>()
        .await;
}

/// Score every slot in original dataset order. Missing slots (failed
/// examples) are excluded from the denominator.
fn score_completions(dataset: &[ConflictExample], opts: &EvalOptions) -> EvalSummary {
    let mut total = 0usize;
    let mut thinking = 0usize;
    let mut code_markdown = 0usize;
    let mut conflict_preserved = 0usize;
    let mut semantic = 0usize;
    let mut exact = 0usize;

    for (idx, example) in dataset.iter().enumerate() {
        let path = slot_path(&opts.output_dir, idx);
        let completion = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => {
                warn!(idx, "missing output slot, excluded from scoring");
                continue;
            }
        };
        total += 1;

        if format_reward(&completion) > 0.0 {
            thinking += 1;
        }
        if code_markdown_reward(&completion) > 0.0 {
            code_markdown += 1;
        }

        let reward = merged_conflict_reward(
            &example.question,
            &completion,
            &example.answer,
            opts.language,
        );
        if reward == RewardScore::ConflictPreserved {
            conflict_preserved += 1;
        }
        if reward.value() >= RewardScore::Semantic.value() {
            semantic += 1;
        }
        if reward == RewardScore::Exact {
            exact += 1;
        }
    }

    EvalSummary {
        model_name: opts.model_name.clone(),
        language: opts.language,
        dataset: opts.dataset.clone(),
        split: opts.split.clone(),
        total,
        pct_thinking: pct(thinking, total),
        pct_code_markdown: pct(code_markdown, total),
        pct_conflict_preserved: pct(conflict_preserved, total),
        pct_semantic: pct(semantic, total),
        pct_exact: pct(exact, total),
    }
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}
