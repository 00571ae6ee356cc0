use serde_json::Value;

/// Pulls a JSON document out of raw model output.
pub trait ResponseExtractor: Send + Sync {
    /// Extract and parse the JSON payload of a model reply.
    fn extract(&self, raw_output: &str) -> Result<Value, serde_json::Error>;

    /// Get the name of this extractor for logging
    fn name(&self) -> &'static str;
}
