mod brace_span;
mod fence_stripper;
mod fields;
mod normalizer;
mod response_extractor;

pub use brace_span::BraceSpanExtractor;
pub use fence_stripper::{strip_fences, FenceStripper};
pub use normalizer::Normalizer;
pub use response_extractor::ResponseExtractor;
