//! Craft failures with their stage context.

use thiserror::Error;

use chainwave_model::{EngineError, SegmentId};

/// A craft stage failure, carrying enough context for operator diagnosis.
#[derive(Debug, Error)]
#[error("craft stage {stage} failed for segment {segment_id}: {source}")]
pub struct CraftError {
    /// The segment being fabricated.
    pub segment_id: SegmentId,
    /// Name of the stage that failed.
    pub stage: &'static str,
    /// The underlying engine error.
    #[source]
    pub source: EngineError,
}

impl CraftError {
    /// Whether the Follower may retry the craft operation.
    pub fn is_retryable(&self) -> bool {
        self.source.is_retryable()
    }
}
