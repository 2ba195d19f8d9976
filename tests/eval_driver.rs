use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use merge_bench::dataset::ConflictExample;
use merge_bench::eval::{run_eval, slot_path, EvalOptions};
use merge_bench::language::Language;
use merge_bench::model::Inference;
use merge_bench::gateway::QueryError;
use tempfile::tempdir;

/// Answers from a fixed script keyed by prompt; unknown prompts fail.
struct ScriptedModel {
    responses: HashMap<String, String>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(responses: &[(&str, &str)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Inference for ScriptedModel {
    async fn inference(&self, prompt: &str) -> Result<String, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(prompt)
            .cloned()
            .ok_or_else(|| QueryError::provider("stub", "no scripted response", false))
    }
}

fn example(question: &str, answer: &str) -> ConflictExample {
    ConflictExample {
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

fn completion(block: &str) -> String {
    format!("<think>\nreasoning\n</think>\n```java\n{block}\n```")
}

fn opts(output_dir: std::path::PathBuf) -> EvalOptions {
    EvalOptions {
        model_name: "openai/gpt-4".to_string(),
        language: Language::Java,
        dataset: "merges/repos_github_java/dataset/test.jsonl".to_string(),
        split: "test".to_string(),
        output_dir,
        max_workers: 4,
        max_samples: None,
    }
}

#[tokio::test]
async fn aggregates_reward_tiers_across_a_run() {
    let dir = tempdir().unwrap();
    let dataset = vec![
        example("q_exact", "int x = 1;"),
        example("q_semantic", "int y = 2;"),
        example("q_conflict", "int z = 3;"),
        example("q_wrong", "int w = 4;"),
    ];
    let model = ScriptedModel::new(&[
        ("q_exact", &completion("int x = 1;")),
        ("q_semantic", &completion("int  y =  2; // merged")),
        (
            "q_conflict",
            &completion("<<<<<<< HEAD\nint z = 3;\n=======\nint z = 4;\n>>>>>>> theirs"),
        ),
        ("q_wrong", "no code block at all"),
    ]);

    let summary = run_eval(&model, &dataset, &opts(dir.path().to_path_buf()))
        .await
        .unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.pct_exact, 25.0);
    assert_eq!(summary.pct_semantic, 50.0); // exact counts as >= semantic
    assert_eq!(summary.pct_conflict_preserved, 25.0);
    assert_eq!(summary.pct_thinking, 75.0);
    assert_eq!(summary.pct_code_markdown, 75.0);

    let results = std::fs::read_to_string(dir.path().join("results.txt")).unwrap();
    assert!(results.contains("Dataset: merges/repos_github_java/dataset/test.jsonl"));
    assert!(results.contains("Split: test"));
    assert!(results.contains("Total merges evaluated: 4"));
}

#[tokio::test]
async fn failed_examples_are_excluded_from_the_denominator() {
    let dir = tempdir().unwrap();
    let dataset = vec![
        example("q_ok", "int x = 1;"),
        example("q_fails", "int y = 2;"),
    ];
    // Only the first prompt is scripted; the second errors and is skipped.
    let model = ScriptedModel::new(&[("q_ok", &completion("int x = 1;"))]);

    let summary = run_eval(&model, &dataset, &opts(dir.path().to_path_buf()))
        .await
        .unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.pct_exact, 100.0);
    assert!(slot_path(dir.path(), 0).exists());
    assert!(!slot_path(dir.path(), 1).exists());
}

#[tokio::test]
async fn existing_slots_are_not_regenerated() {
    let dir = tempdir().unwrap();
    let dataset = vec![example("q", "int x = 1;")];

    std::fs::write(slot_path(dir.path(), 0), completion("int x = 1;")).unwrap();
    let model = ScriptedModel::new(&[("q", &completion("int x = 1;"))]);

    let summary = run_eval(&model, &dataset, &opts(dir.path().to_path_buf()))
        .await
        .unwrap();

    // Resumed run: slot already present, model never called.
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.pct_exact, 100.0);
}

#[tokio::test]
async fn max_samples_limits_the_run() {
    let dir = tempdir().unwrap();
    let dataset = vec![
        example("q0", "a"),
        example("q1", "a"),
        example("q2", "a"),
    ];
    let model = ScriptedModel::new(&[
        ("q0", &completion("a")),
        ("q1", &completion("a")),
        ("q2", &completion("a")),
    ]);

    let mut options = opts(dir.path().to_path_buf());
    options.max_samples = Some(2);
    let summary = run_eval(&model, &dataset, &options).await.unwrap();

    assert_eq!(summary.total, 2);
    assert!(!slot_path(dir.path(), 2).exists());
}
