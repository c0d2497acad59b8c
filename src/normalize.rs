//! Markdown fence stripping for agent output
//!
//! Agents asked for plain text still like to wrap answers in a fenced block
//! (three backticks, an optional language tag, the body, three backticks).
//! Only the first fenced block is considered. Its inner content replaces the
//! whole string; anything outside it is dropped.

use regex::Regex;
use std::sync::OnceLock;

static FENCE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn fence_pattern() -> &'static Regex {
    FENCE_PATTERN.get_or_init(|| {
        // Opening fence with optional ASCII language tag, shortest body, closing fence
        Regex::new(r"(?s)```(?:(?-u:\w)+)?(?-u:\s)*(.+?)(?-u:\s)*```").expect("fence pattern is valid")
    })
}

/// Strip the first Markdown code fence from `text`, or just trim it when
/// there is none.
pub fn strip_code_fence(text: &str) -> String {
    match fence_pattern().captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => text.trim().to_string(),
    }
}
