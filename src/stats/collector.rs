//! Metrics collection for generation calls

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::providers::GenerationError;

/// How a generation call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    Success,
    ExecutionFailed,
    ParsingFailed,
}

impl GenerationOutcome {
    pub fn from_result(result: &Result<String, GenerationError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(GenerationError::ExecutionFailed { .. }) => Self::ExecutionFailed,
            Err(GenerationError::ParsingFailed) => Self::ParsingFailed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ExecutionFailed => "execution_failed",
            Self::ParsingFailed => "parsing_failed",
        }
    }
}

/// Collected metrics from one generation call
#[derive(Debug, Clone, Serialize)]
pub struct GenerationMetrics {
    /// Unique request ID
    pub request_id: String,
    /// Timestamp of the request
    pub timestamp: DateTime<Utc>,
    /// Provider that handled the request
    pub provider: String,
    /// User prompt length (characters)
    pub prompt_len: usize,
    /// Response length (characters), 0 on failure
    pub output_len: usize,
    /// Time spent inside the provider in ms
    pub duration_ms: f64,
    pub outcome: GenerationOutcome,
}

impl GenerationMetrics {
    /// Start a record for a request about to be sent to `provider`
    pub fn new(provider: &str, user_prompt: &str) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            provider: provider.to_string(),
            prompt_len: user_prompt.chars().count(),
            output_len: 0,
            duration_ms: 0.0,
            outcome: GenerationOutcome::Success,
        }
    }

    /// Fill in the result of the call
    pub fn finish(&mut self, result: &Result<String, GenerationError>, duration_ms: f64) {
        self.duration_ms = duration_ms;
        self.outcome = GenerationOutcome::from_result(result);
        self.output_len = result.as_ref().map(|text| text.chars().count()).unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics() {
        let m = GenerationMetrics::new("claude", "héllo");
        assert_eq!(m.provider, "claude");
        assert_eq!(m.prompt_len, 5);
        assert_eq!(m.output_len, 0);
        assert!(Uuid::parse_str(&m.request_id).is_ok());
    }

    #[test]
    fn test_request_ids_unique() {
        let a = GenerationMetrics::new("claude", "x");
        let b = GenerationMetrics::new("claude", "x");
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_finish_success() {
        let mut m = GenerationMetrics::new("gemini", "q");
        m.finish(&Ok("four".to_string()), 12.5);
        assert_eq!(m.outcome, GenerationOutcome::Success);
        assert_eq!(m.output_len, 4);
        assert_eq!(m.duration_ms, 12.5);
    }

    #[test]
    fn test_finish_failures() {
        let mut m = GenerationMetrics::new("gemini", "q");
        m.finish(
            &Err(GenerationError::ExecutionFailed {
                stderr: "x".to_string(),
            }),
            1.0,
        );
        assert_eq!(m.outcome, GenerationOutcome::ExecutionFailed);
        assert_eq!(m.output_len, 0);

        m.finish(&Err(GenerationError::ParsingFailed), 1.0);
        assert_eq!(m.outcome, GenerationOutcome::ParsingFailed);
    }

    #[test]
    fn test_outcome_serde() {
        assert_eq!(
            serde_json::to_string(&GenerationOutcome::ExecutionFailed).unwrap(),
            "\"execution_failed\""
        );
        assert_eq!(GenerationOutcome::ParsingFailed.as_str(), "parsing_failed");
    }
}
