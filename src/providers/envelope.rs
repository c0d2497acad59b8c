//! Two-tier extraction shared by the response parsers

use super::GenerationError;

/// Pull the answer out of agent stdout.
///
/// The structured field returned by `extract` wins when it is present and
/// non-empty. Otherwise the raw output, trimmed, is used. Empty on both
/// counts is a parsing failure.
pub fn extract_or_raw<F>(data: &[u8], extract: F) -> Result<String, GenerationError>
where
    F: FnOnce(&[u8]) -> Option<String>,
{
    if let Some(text) = extract(data).filter(|t| !t.is_empty()) {
        return Ok(text);
    }

    let raw = String::from_utf8_lossy(data);
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        return Ok(trimmed.to_string());
    }

    Err(GenerationError::ParsingFailed)
}

/// Iterate over the lines of a JSON Lines stream that parse as `T`
pub fn json_lines<'a, T>(data: &'a [u8]) -> impl Iterator<Item = T> + 'a
where
    T: serde::de::DeserializeOwned + 'a,
{
    data.split(|b| *b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .filter_map(|line| serde_json::from_slice(line).ok())
}
