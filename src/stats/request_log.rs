//! Prompt logging formatter

/// Format an inbound prompt as a compact one-line log message
pub fn format_prompt_log(provider: &str, user_prompt: &str) -> String {
    let normalized = normalize_whitespace(user_prompt);
    format!(
        "→ provider={} chars={} \"{}\"",
        provider,
        user_prompt.chars().count(),
        truncate_message(&normalized)
    )
}

/// Convert newlines and tabs to single spaces, collapse multiple spaces
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate message according to rules:
/// - If <= 100 chars: show all
/// - If > 100 chars: first 25 + " ... " + last 75
fn truncate_message(s: &str) -> String {
    const MAX_TOTAL: usize = 100;
    const PREFIX_LEN: usize = 25;
    const SUFFIX_LEN: usize = 75;
    const ELLIPSIS: &str = " ... ";

    let total = s.chars().count();
    if total <= MAX_TOTAL {
        return s.to_string();
    }

    let prefix: String = s.chars().take(PREFIX_LEN).collect();
    let suffix: String = s.chars().skip(total - SUFFIX_LEN).collect();

    format!("{}{}{}", prefix, ELLIPSIS, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_prompt_log_basic() {
        let log = format_prompt_log("gemini", "What is 2+2?");
        assert!(log.contains("provider=gemini"));
        assert!(log.contains("chars=12"));
        assert!(log.contains("\"What is 2+2?\""));
    }

    #[test]
    fn test_format_prompt_log_single_line() {
        let log = format_prompt_log("claude", "line one\nline two\n\tindented");
        assert!(!log.contains('\n'));
        assert!(log.contains("\"line one line two indented\""));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("hello\nworld"), "hello world");
        assert_eq!(normalize_whitespace("hello\t\tworld"), "hello world");
        assert_eq!(normalize_whitespace("hello\r\nworld"), "hello world");
        assert_eq!(normalize_whitespace("hello   world"), "hello world");
    }

    #[test]
    fn test_truncate_message_short() {
        let msg = "This is a short message";
        assert_eq!(truncate_message(msg), msg);
    }

    #[test]
    fn test_truncate_message_exactly_100() {
        let msg = "x".repeat(100);
        assert_eq!(truncate_message(&msg).len(), 100);
    }

    #[test]
    fn test_truncate_message_long() {
        let msg = "x".repeat(300);
        let truncated = truncate_message(&msg);
        assert!(truncated.starts_with(&"x".repeat(25)));
        assert!(truncated.contains(" ... "));
        assert!(truncated.ends_with(&"x".repeat(75)));
    }

    #[test]
    fn test_truncate_multibyte() {
        let msg = "ü".repeat(150);
        let truncated = truncate_message(&msg);
        assert_eq!(truncated.chars().count(), 105);
    }
}
