//! Layered reward functions for merge-conflict resolution quality.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::{extract_answer, extract_code_block};
use crate::language::Language;
use crate::normalize::normalize;

/// The four literal tokens a merge tool inserts to delimit unresolved regions.
pub const CONFLICT_MARKERS: [&str; 4] = ["<<<<<<<", "=======", "|||||||", ">>>>>>>"];

/// Structural pattern for the think/answer format: some prefix, a newline, the
/// literal closing think-tag, a newline, then any remainder.
static THINKING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A.*?\n</think>\n.*\z").expect("valid regex"));

/// Fenced code block anywhere in the answer text.
static ANY_CODE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[^\n]*\n.*?\n```").expect("valid regex"));

/// Discrete resolution grade. Never a continuous value: always one of the four
/// constants exposed by [`RewardScore::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardScore {
    /// Extracted block is byte-for-byte equal to the trimmed ground truth.
    Exact,
    /// Equal after per-language comment/whitespace normalization.
    Semantic,
    /// The model echoed the conflict instead of resolving it.
    ConflictPreserved,
    /// No code block, or a wrong resolution.
    None,
}

impl RewardScore {
    pub fn value(self) -> f64 {
        match self {
            RewardScore::Exact => 1.0,
            RewardScore::Semantic => 0.5,
            RewardScore::ConflictPreserved => 0.1,
            RewardScore::None => 0.0,
        }
    }
}

/// 0.5 when the completion has a well-formed think/answer separation, 0.0
/// otherwise. Structural check only; the content of either part is ignored.
pub fn format_reward(completion: &str) -> f64 {
    if THINKING_RE.is_match(completion) {
        0.5
    } else {
        0.0
    }
}

/// 1.0 when the answer portion contains a fenced code block (any or no
/// language tag), 0.0 otherwise.
pub fn code_markdown_reward(completion: &str) -> f64 {
    if ANY_CODE_BLOCK_RE.is_match(extract_answer(completion)) {
        1.0
    } else {
        0.0
    }
}

/// Whether code contains any of the four canonical conflict-marker tokens.
pub fn has_conflict_markers(code: &str) -> bool {
    CONFLICT_MARKERS.iter().any(|marker| code.contains(marker))
}

/// Grade a resolution against ground truth.
///
/// Rules apply in strict priority order; the first match wins. Exact match is
/// checked before semantic match, so an exact resolution can never be
/// downgraded by normalization.
///
/// Conflict preservation is detected by scanning the extracted block for
/// marker tokens rather than comparing against the conflicted block in the
/// prompt; the scan does not depend on byte-level reproduction of the prompt.
/// The prompt parameter is kept for signature stability with the other reward
/// functions.
pub fn merged_conflict_reward(
    _prompt: &str,
    completion: &str,
    answer: &str,
    language: Language,
) -> RewardScore {
    let answer_text = extract_answer(completion);
    let Some(code_block) = extract_code_block(answer_text) else {
        return RewardScore::None;
    };

    let answer = answer.trim();
    if code_block == answer {
        return RewardScore::Exact;
    }
    if normalize(&code_block, language) == normalize(answer, language) {
        return RewardScore::Semantic;
    }
    if has_conflict_markers(&code_block) {
        return RewardScore::ConflictPreserved;
    }
    RewardScore::None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "int x = 1;";

    fn completion_with(block: &str) -> String {
        format!("<think>\nreasoning\n</think>\n```java\n{block}\n```")
    }

    #[test]
    fn round_trip_exact_match() {
        let completion = completion_with("int x = 1;");
        assert_eq!(format_reward(&completion), 0.5);
        assert_eq!(code_markdown_reward(&completion), 1.0);
        assert_eq!(
            merged_conflict_reward("prompt", &completion, ANSWER, Language::Java),
            RewardScore::Exact
        );
    }

    #[test]
    fn format_reward_requires_newlines_around_tag() {
        assert_eq!(format_reward("<think>\nreasoning\n</think>\nanswer"), 0.5);
        // No newline immediately before the closing tag.
        assert_eq!(format_reward("<think>\nreasoning</think>\nanswer"), 0.0);
        assert_eq!(format_reward("no tag at all"), 0.0);
    }

    #[test]
    fn semantic_match_ignores_comments_and_spacing() {
        let completion = completion_with("int  x =  1; // comment");
        assert_eq!(
            merged_conflict_reward("prompt", &completion, ANSWER, Language::Java),
            RewardScore::Semantic
        );
    }

    #[test]
    fn exact_outranks_semantic() {
        // Byte-equal after trim must short-circuit before normalization runs.
        let completion = completion_with(ANSWER);
        assert_eq!(
            merged_conflict_reward("prompt", &completion, &format!("  {ANSWER}\n"), Language::Java),
            RewardScore::Exact
        );
    }

    #[test]
    fn preserved_conflict_scores_low() {
        let block = "<<<<<<< HEAD\nint x = 1;\n=======\nint x = 2;\n>>>>>>> branch";
        let completion = completion_with(block);
        assert_eq!(
            merged_conflict_reward("prompt", &completion, ANSWER, Language::Java),
            RewardScore::ConflictPreserved
        );
    }

    #[test]
    fn no_code_block_scores_zero() {
        let completion = "<think>\nreasoning\n</think>\nI refuse to answer in code.";
        assert_eq!(code_markdown_reward(completion), 0.0);
        assert_eq!(
            merged_conflict_reward("prompt", completion, ANSWER, Language::Java),
            RewardScore::None
        );
    }

    #[test]
    fn empty_completion_scores_zero() {
        assert_eq!(format_reward(""), 0.0);
        assert_eq!(code_markdown_reward(""), 0.0);
        assert_eq!(
            merged_conflict_reward("prompt", "", ANSWER, Language::Java),
            RewardScore::None
        );
    }

    #[test]
    fn wrong_resolution_scores_zero() {
        let completion = completion_with("int x = 99;");
        assert_eq!(
            merged_conflict_reward("prompt", &completion, ANSWER, Language::Java),
            RewardScore::None
        );
    }

    #[test]
    fn reward_is_always_one_of_four_constants() {
        let cases = [
            completion_with(ANSWER),
            completion_with("int x=1; //c"),
            completion_with("<<<<<<< a"),
            completion_with("wrong"),
            String::from("no block"),
        ];
        for completion in &cases {
            let score =
                merged_conflict_reward("p", completion, ANSWER, Language::Java).value();
            assert!([0.0, 0.1, 0.5, 1.0].contains(&score), "got {score}");
        }
    }

    #[test]
    fn code_markdown_reward_only_sees_answer_portion() {
        // A fenced block inside the reasoning does not count.
        let completion = "<think>\n```java\nint x = 1;\n```\n</think>\nno block here";
        assert_eq!(code_markdown_reward(completion), 0.0);
    }
}
