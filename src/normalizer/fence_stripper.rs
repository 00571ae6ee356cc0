use serde_json::Value;

use crate::normalizer::ResponseExtractor;

/// Remove a leading ```` ```json ```` or ```` ``` ```` marker and a trailing
/// ```` ``` ```` marker. Only those exact markers are stripped; any other
/// fence style passes through untouched.
pub fn strip_fences(raw_output: &str) -> &str {
    let mut cleaned = raw_output.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Extractor that strips markdown fences and parses what is left.
pub struct FenceStripper;

impl Default for FenceStripper {
    fn default() -> Self {
        Self::new()
    }
}

impl FenceStripper {
    pub fn new() -> Self {
        Self
    }
}

impl ResponseExtractor for FenceStripper {
    fn extract(&self, raw_output: &str) -> Result<Value, serde_json::Error> {
        serde_json::from_str(strip_fences(raw_output))
    }

    fn name(&self) -> &'static str {
        "FenceStripper"
    }
}
