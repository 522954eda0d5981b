//! Engine configuration surface.

use serde::{Deserialize, Serialize};

use crate::content::ProgramType;
use crate::error::ConfigError;

/// Everything the fabrication core reads from configuration.
///
/// Deserializable from JSON with per-field defaults; [`EngineConfig::validate`]
/// must pass before any worker uses the values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How far ahead of playback the Leader keeps segments planned.
    pub buffer_ahead_seconds: u64,
    /// Chains the Leader and segments a Follower process per tick.
    pub follower_batch_size: usize,
    /// Ingest cache entry lifetime.
    pub cache_ttl_seconds: u64,
    /// Score added per matching meme during isometry selection.
    pub meme_match_score: f64,
    /// A `Fabricate` chain with no segment progress for this long is
    /// revived by the heartbeat.
    pub chain_stale_seconds: u64,
    /// Transient-failure retries before a segment is marked failed.
    pub segment_retry_limit: u32,
    /// Craft lanes muted to silence; their stages record no choices.
    pub muted_lanes: Vec<ProgramType>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_ahead_seconds: 120,
            follower_batch_size: 8,
            cache_ttl_seconds: 300,
            meme_match_score: 0.25,
            chain_stale_seconds: 600,
            segment_retry_limit: 3,
            muted_lanes: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Validates all parameters, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_ahead_seconds == 0 {
            return Err(ConfigError::OutOfRange {
                name: "buffer_ahead_seconds",
                message: "must be positive".into(),
            });
        }
        if self.follower_batch_size == 0 {
            return Err(ConfigError::OutOfRange {
                name: "follower_batch_size",
                message: "must be positive".into(),
            });
        }
        if self.cache_ttl_seconds == 0 {
            return Err(ConfigError::OutOfRange {
                name: "cache_ttl_seconds",
                message: "must be positive".into(),
            });
        }
        if !self.meme_match_score.is_finite() || self.meme_match_score <= 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "meme_match_score",
                message: format!("must be a positive finite number, got {}", self.meme_match_score),
            });
        }
        if self.chain_stale_seconds == 0 {
            return Err(ConfigError::OutOfRange {
                name: "chain_stale_seconds",
                message: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Unreadable(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
