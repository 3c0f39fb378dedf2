use regex::Regex;
use std::sync::LazyLock;

use crate::error::{PromptError, Result};
use crate::types::StructuredPromptInput;

// Pre-compiled regexes for performance
static JSON_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json|JSON)?[ \t]*\n([\s\S]*?)```").expect("invalid regex")
});

/// Extract the JSON object carried by a model response
///
/// Prefers the first fenced block (```json or bare ```) whose body is an
/// object; otherwise falls back to the outermost `{ ... }` span.
pub fn extract_json_block(text: &str) -> Option<String> {
    let fenced = JSON_BLOCK_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim()))
        .find(|body| body.starts_with('{'));
    if let Some(body) = fenced {
        return Some(body.to_string());
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| text[start..=end].to_string())
}

/// Parse structured prompt fields out of a model response
pub fn parse_structured_input(text: &str) -> Result<StructuredPromptInput> {
    let json = extract_json_block(text).ok_or(PromptError::MissingStructuredOutput)?;
    Ok(serde_json::from_str(&json)?)
}
