//! Generation metrics and log formatting

mod collector;
mod formatter;
mod request_log;

pub use collector::{GenerationMetrics, GenerationOutcome};
pub use formatter::format_metrics;
pub use request_log::format_prompt_log;
