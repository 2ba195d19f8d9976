//! Prompt templates for merge-conflict resolution queries.

use crate::language::Language;

/// System prompt for models trained on the think/answer convention.
pub const SYSTEM_PROMPT: &str = "A conversation between User and Assistant. The user asks a question, \
and the Assistant solves it. The assistant first thinks about the \
reasoning process in the mind and then provides the user with the answer. \
The reasoning process is enclosed within <think> </think> followed by \
the answer, i.e., <think> reasoning process here </think> answer here";

/// Instructions preceding the conflicted snippet.
pub const QUERY_PROMPT: &str = "You are a semantic merge conflict resolution expert. Below is a snippet \
of code with surrounding context that includes a merge conflict.\n\
Return the entire snippet (including full context) in markdown code syntax \
as provided, make sure you do not modify the context at all and preserve \
the spacing as is.\n\
Think in terms of intent and semantics that both sides of the merge are \
trying to achieve.\n\
If you are not sure on how to resolve the conflict or if the intent is \
ambiguous, please return the same snippet with the conflict.\n\
Here is the code snippet:\n";

/// Render a full conflict-resolution query: instructions followed by the
/// conflicted snippet in a fenced block tagged for the language.
pub fn render_query(snippet: &str, language: Language) -> String {
    format!(
        "{QUERY_PROMPT}```{}\n{}\n```",
        language.markdown_tag(),
        snippet
    )
}
