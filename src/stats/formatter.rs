//! Stats formatting for different output formats

use super::GenerationMetrics;
use crate::config::StatsFormat;

/// Format metrics according to the configured format
pub fn format_metrics(metrics: &GenerationMetrics, format: StatsFormat) -> String {
    match format {
        StatsFormat::Pretty => format_pretty(metrics),
        StatsFormat::Json => format_json(metrics),
        StatsFormat::Compact => format_compact(metrics),
    }
}

/// Pretty box format for terminal output
fn format_pretty(m: &GenerationMetrics) -> String {
    format!(
        r#"┌──────────────────────────────────────────────────────────────────┐
│ Generation Metrics                                               │
├──────────────────────────────────────────────────────────────────┤
│ Provider: {:55}│
│ Request:  {:55}│
│ Time:     {:55}│
├──────────────────────────────────────────────────────────────────┤
│ Prompt: {:7} chars │ Output: {:7} chars                      │
│ Outcome: {:56}│
│ Duration: {:54.1}ms│
└──────────────────────────────────────────────────────────────────┘
"#,
        truncate(&m.provider, 55),
        m.request_id,
        m.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        m.prompt_len,
        m.output_len,
        m.outcome.as_str(),
        m.duration_ms,
    )
}

/// JSON format for structured logging
fn format_json(m: &GenerationMetrics) -> String {
    serde_json::to_string(m).unwrap_or_else(|_| "{}".to_string())
}

/// Compact single-line format
fn format_compact(m: &GenerationMetrics) -> String {
    format!(
        "[{}] provider={} outcome={} prompt={} output={} dur={:.1}ms",
        m.timestamp.format("%H:%M:%S"),
        m.provider,
        m.outcome.as_str(),
        m.prompt_len,
        m.output_len,
        m.duration_ms
    )
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
