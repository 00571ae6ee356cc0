use serde_json::Value;
use tracing::debug;

use crate::normalizer::{FenceStripper, ResponseExtractor};

/// Tolerant extractor for replies wrapped in prose or unusual fences.
///
/// Tries the fence-stripping baseline first, then parses the span between
/// the first `{` and the last `}`.
pub struct BraceSpanExtractor {
    baseline: FenceStripper,
}

impl Default for BraceSpanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BraceSpanExtractor {
    pub fn new() -> Self {
        Self {
            baseline: FenceStripper::new(),
        }
    }

    fn object_span(raw_output: &str) -> Option<&str> {
        let start = raw_output.find('{')?;
        let end = raw_output.rfind('}')?;
        (end > start).then(|| &raw_output[start..=end])
    }
}

impl ResponseExtractor for BraceSpanExtractor {
    fn extract(&self, raw_output: &str) -> Result<Value, serde_json::Error> {
        let err = match self.baseline.extract(raw_output) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match Self::object_span(raw_output) {
            Some(span) => {
                debug!(
                    "Baseline parse failed, retrying on {} byte object span",
                    span.len()
                );
                serde_json::from_str(span).map_err(|_| err)
            }
            None => Err(err),
        }
    }

    fn name(&self) -> &'static str {
        "BraceSpanExtractor"
    }
}
