//! HTTP API types

mod prompt;

pub use prompt::*;
