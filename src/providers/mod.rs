//! AI agent providers
//!
//! Every provider wraps one command-line agent behind the [`Generator`]
//! trait: build the agent's command line, run it, and reduce whatever it
//! prints to a single plain-text answer.

mod claude;
mod codex;
mod command;
mod continue_cli;
mod envelope;
mod gemini;
mod opencode;
mod registry;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AppConfig;

pub use claude::{parse_claude_response, ClaudeClient, CLAUDE_JSON_SCHEMA};
pub use codex::{parse_codex_response, CodexClient};
pub use command::{run_cli, CliSettings};
pub use continue_cli::{parse_continue_response, ContinueClient};
pub use gemini::{parse_gemini_response, GeminiClient};
pub use opencode::{parse_opencode_response, OpenCodeClient};
pub use registry::{ProviderDescriptor, ProviderRegistry};

/// Names of the compiled-in providers
pub const PROVIDER_NAMES: [&str; 5] = [
    ClaudeClient::NAME,
    GeminiClient::NAME,
    CodexClient::NAME,
    ContinueClient::NAME,
    OpenCodeClient::NAME,
];

/// Why a generation attempt failed. Logged, never shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The agent could not be started or exited unsuccessfully
    #[error("CLI execution failed: {stderr}")]
    ExecutionFailed { stderr: String },

    /// The agent produced no usable text
    #[error("failed to parse response")]
    ParsingFailed,
}

/// A backend that turns a system prompt and a user prompt into text.
///
/// Implementations hold no mutable state; every call runs its own agent
/// process, so concurrent calls never observe each other.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Registry key, e.g. `"claude"`
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Run the agent to completion and return its answer
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerationError>;
}

/// Prompt for agents without a separate system prompt flag
pub(crate) fn combined_prompt(system_prompt: &str, user_prompt: &str) -> String {
    format!("{}\n\n{}", system_prompt, user_prompt)
}

/// Create the registry with every compiled-in provider, applying binary
/// overrides and the generation timeout from `config`
pub fn create_default_registry(config: &AppConfig) -> ProviderRegistry {
    let timeout = config.generation.timeout();
    let settings = |name: &str, default_binary: &str| {
        let binary = config
            .providers
            .get(name)
            .and_then(|p| p.binary.clone())
            .unwrap_or_else(|| default_binary.to_string());
        CliSettings::new(binary).with_timeout(timeout)
    };

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(ClaudeClient::new(settings(
        ClaudeClient::NAME,
        ClaudeClient::DEFAULT_BINARY,
    ))));
    registry.register(Arc::new(GeminiClient::new(settings(
        GeminiClient::NAME,
        GeminiClient::DEFAULT_BINARY,
    ))));
    registry.register(Arc::new(CodexClient::new(settings(
        CodexClient::NAME,
        CodexClient::DEFAULT_BINARY,
    ))));
    registry.register(Arc::new(ContinueClient::new(settings(
        ContinueClient::NAME,
        ContinueClient::DEFAULT_BINARY,
    ))));
    registry.register(Arc::new(OpenCodeClient::new(settings(
        OpenCodeClient::NAME,
        OpenCodeClient::DEFAULT_BINARY,
    ))));

    for name in config.providers.keys() {
        if !registry.contains(name) {
            tracing::warn!(provider = %name, "Ignoring settings for unknown provider");
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    #[test]
    fn test_combined_prompt() {
        assert_eq!(combined_prompt("sys", "user"), "sys\n\nuser");
    }

    #[test]
    fn test_default_registry_has_all_providers() {
        let registry = create_default_registry(&AppConfig::default());
        assert_eq!(registry.len(), PROVIDER_NAMES.len());
        for name in PROVIDER_NAMES {
            assert!(registry.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_default_descriptions() {
        let registry = create_default_registry(&AppConfig::default());
        let descriptors = registry.descriptors();
        let find = |name: &str| {
            descriptors
                .iter()
                .find(|d| d.name == name)
                .map(|d| d.description.clone())
                .unwrap()
        };
        assert_eq!(find("claude"), "Claude Code");
        assert_eq!(find("gemini"), "Google Gemini");
        assert_eq!(find("codex"), "OpenAI Codex");
        assert_eq!(find("continue"), "Continue");
        assert_eq!(find("opencode"), "OpenCode");
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::ExecutionFailed {
            stderr: "boom".to_string(),
        };
        assert!(err.to_string().contains("boom"));
        assert_eq!(GenerationError::ParsingFailed.to_string(), "failed to parse response");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_binary_override_applied() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "gemini".to_string(),
            ProviderConfig {
                binary: Some("echo".to_string()),
            },
        );
        let registry = create_default_registry(&config);

        let text = registry.get("gemini").unwrap().generate("sys", "q").await.unwrap();
        assert_eq!(text, "-p sys\n\nq --output-format json");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let mut config = AppConfig::default();
        for name in ["gemini", "continue"] {
            config.providers.insert(
                name.to_string(),
                ProviderConfig {
                    binary: Some("echo".to_string()),
                },
            );
        }
        let registry = create_default_registry(&config);
        let gemini = registry.get("gemini").unwrap().clone();
        let cont = registry.get("continue").unwrap().clone();

        let (a, b) = tokio::join!(gemini.generate("s1", "one"), cont.generate("s2", "two"));
        assert_eq!(a.unwrap(), "-p s1\n\none --output-format json");
        assert_eq!(b.unwrap(), "-p s2\n\ntwo --format json --silent");
    }
}
