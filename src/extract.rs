//! Structural extraction from free-form model output.
//!
//! Both helpers are pure functions over the completion text. The matching is
//! regex-based; callers only depend on the contracts here, so the strategy
//! could be swapped for a hand-written scanner without touching them.

use once_cell::sync::Lazy;
use regex::Regex;

/// First fenced block: a line starting with three backticks (any language tag),
/// the interior, then a closing line of three backticks.
static CODE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)\n```").expect("valid regex"));

/// Extract the first fenced code block from markdown-formatted text.
///
/// The interior is trimmed of leading/trailing whitespace. Returns `None` when
/// no fenced block exists. Only the first block is considered; everything
/// after it is ignored.
pub fn extract_code_block(text: &str) -> Option<String> {
    CODE_BLOCK_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_owned())
}

/// Return the answer portion of a completion: everything after the first
/// `</think>`, or the whole text when the marker is absent.
pub fn extract_answer(text: &str) -> &str {
    match text.split_once("</think>") {
        Some((_, rest)) => rest,
        None => text,
    }
}
