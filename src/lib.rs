//! local-ai-tool-proxy: HTTP bridge from web apps to local AI CLI agents
//!
//! Features:
//! - One `POST /prompt` endpoint in front of claude, gemini, codex, continue and opencode
//! - Uniform plain-text answers, with Markdown code fences stripped
//! - Configurable CORS origin, optional HTTPS
//! - Per-request generation metrics

pub mod api;
pub mod config;
pub mod normalize;
pub mod providers;
pub mod server;
pub mod stats;

pub use config::AppConfig;
pub use providers::{create_default_registry, GenerationError, Generator, ProviderRegistry};
pub use server::{run_server, ProxyState};
