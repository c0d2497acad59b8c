use std::path::Path;

use super::{AppConfig, ConfigError};

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;

    Ok(config)
}

/// Read a system prompt file, trimmed. An empty prompt is an error.
pub fn load_system_prompt<P: AsRef<Path>>(path: P) -> Result<String, ConfigError> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SystemPrompt {
        path: path.display().to_string(),
        source,
    })?;

    let prompt = content.trim();
    if prompt.is_empty() {
        return Err(ConfigError::Validation(format!(
            "System prompt file is empty: {}",
            path.display()
        )));
    }

    Ok(prompt.to_string())
}
