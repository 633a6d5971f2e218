//! Model reply sanitization and JSON recovery.
//!
//! Models wrap the requested JSON object in code fences, prose, or both.
//! [`ResponseParser`] strips control characters and prompt-injection
//! markers, finds the first balanced JSON object, and flattens it into a
//! `field -> candidate string` map.

use std::collections::BTreeMap;

use thiserror::Error;

/// Maximum accepted reply length (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Maximum length of one candidate value (10KB).
pub const MAX_FIELD_LENGTH: usize = 10_000;

const INJECTION_MARKERS: [&str; 11] = [
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("no JSON object in response")]
    NoObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// Recovers a flat candidate map from a model reply.
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    additional_markers: Vec<String>,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra markers to strip on top of the built-in list.
    pub fn with_additional_markers(mut self, markers: Vec<String>) -> Self {
        self.additional_markers = markers;
        self
    }

    /// Parses `reply` into candidates.
    ///
    /// Nulls and empty strings are dropped; numbers and booleans become
    /// strings; nested arrays and objects are skipped.
    pub fn parse(&self, reply: &str) -> Result<BTreeMap<String, String>, ParseError> {
        let cleaned = self.sanitize(reply)?;
        let json = extract_json_object(&cleaned).ok_or(ParseError::NoObject)?;

        let value: serde_json::Value =
            serde_json::from_str(&json).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
        let serde_json::Value::Object(object) = value else {
            return Err(ParseError::NoObject);
        };

        Ok(object
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                let text = clean_field(&text);
                (!text.is_empty()).then(|| (key.trim().to_string(), text))
            })
            .collect())
    }

    /// Length check, control characters, injection markers.
    pub fn sanitize(&self, reply: &str) -> Result<String, ParseError> {
        if reply.len() > MAX_RESPONSE_LENGTH {
            return Err(ParseError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: reply.len(),
            });
        }

        let mut result: String = reply
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect();

        for marker in INJECTION_MARKERS {
            result = result.replace(marker, "");
        }
        for marker in &self.additional_markers {
            result = result.replace(marker.as_str(), "");
        }

        Ok(result)
    }
}

/// Fenced block first, then the first balanced `{...}`.
fn extract_json_object(reply: &str) -> Option<String> {
    let trimmed = reply.trim();

    if let Some(fenced) = extract_from_code_block(trimmed) {
        if let Some(object) = balanced_object(&fenced) {
            return Some(object);
        }
    }

    balanced_object(trimmed)
}

fn extract_from_code_block(s: &str) -> Option<String> {
    let fences = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    for fence in fences {
        if let Some(start) = s.find(fence) {
            let body_start = start + fence.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim().to_string());
            }
        }
    }
    None
}

fn balanced_object(s: &str) -> Option<String> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(s[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Strips HTML-like tags and caps the length on a char boundary.
fn clean_field(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    let trimmed = result.trim();
    if trimmed.len() <= MAX_FIELD_LENGTH {
        return trimmed.to_string();
    }
    let mut cut = MAX_FIELD_LENGTH;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    trimmed[..cut].to_string()
}
