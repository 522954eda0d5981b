//! Check-config command implementation.

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use chainwave_model::EngineConfig;

/// Run the check-config command.
///
/// # Arguments
/// * `path` - Path to the engine config JSON file
///
/// # Returns
/// Exit code: 0 if the config parses and validates, 1 otherwise
pub fn run(path: &str) -> Result<ExitCode> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path}"))?;
    match EngineConfig::from_json(&json) {
        Ok(config) => {
            println!("{} {path}", "ok".green().bold());
            println!("  buffer_ahead_seconds  {}", config.buffer_ahead_seconds);
            println!("  follower_batch_size   {}", config.follower_batch_size);
            println!("  cache_ttl_seconds     {}", config.cache_ttl_seconds);
            println!("  meme_match_score      {}", config.meme_match_score);
            println!("  chain_stale_seconds   {}", config.chain_stale_seconds);
            println!("  segment_retry_limit   {}", config.segment_retry_limit);
            if !config.muted_lanes.is_empty() {
                println!("  muted_lanes           {:?}", config.muted_lanes);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{} {path}: {err}", "invalid".red().bold());
            Ok(ExitCode::from(1))
        }
    }
}
