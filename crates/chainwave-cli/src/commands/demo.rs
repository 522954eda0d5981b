//! Demo command implementation.
//!
//! Fabricates a bounded number of segments against the built-in demo
//! library and prints what each one became.

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;

use chainwave_model::{seconds_from_micros, ChainId, Segment, SegmentState};
use chainwave_work::{SegmentStore, WorkSchedule};

use super::{demo_manager, load_config};

/// Run the demo command.
///
/// # Arguments
/// * `segments` - Number of segments to fabricate before stopping
/// * `config_path` - Optional engine config JSON file
/// * `json` - Emit the fabricated segments as JSON instead of a table
///
/// # Returns
/// Exit code: 0 when every requested segment shipped, 1 otherwise
pub fn run(segments: u64, config_path: Option<&str>, json: bool) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let (store, manager) = demo_manager(config, WorkSchedule::default())?;

    // One tick plans one segment and pushes it through the whole pipeline;
    // the extra headroom covers retries.
    let max_ticks = segments * 4 + 8;
    let mut shipped: Vec<Segment> = Vec::new();
    for _ in 0..max_ticks {
        let report = manager.tick()?;
        for id in report.shipped {
            if let Some(segment) = store.load_segment(id)? {
                shipped.push(segment);
            }
        }
        if shipped.len() as u64 >= segments {
            break;
        }
    }
    shipped.sort_by_key(|s| s.offset);
    shipped.truncate(segments as usize);

    if json {
        println!("{}", serde_json::to_string_pretty(&shipped)?);
    } else {
        print_table(&shipped);
    }

    if (shipped.len() as u64) < segments {
        let latest = store.latest_segment(ChainId(1))?;
        let stuck = latest
            .filter(|s| s.state == SegmentState::Failed)
            .and_then(|s| s.error_message);
        if let Some(message) = stuck {
            eprintln!("{}: {message}", "fabrication failed".red().bold());
        } else {
            eprintln!(
                "{}: shipped {} of {segments} segments",
                "incomplete".yellow().bold(),
                shipped.len()
            );
        }
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_table(shipped: &[Segment]) {
    println!("{}", "Chainwave Demo".cyan().bold());
    println!("{}", "==============".cyan());
    for segment in shipped {
        let memes: Vec<&str> = segment.memes.iter().map(String::as_str).collect();
        println!(
            "{} offset {} at {:.1}s for {:.1}s",
            "segment".bold(),
            segment.offset,
            seconds_from_micros(segment.begin_at),
            seconds_from_micros(segment.duration),
        );
        println!(
            "  {} {} at {:.0} bpm, density {:.2}",
            "frame".green(),
            segment.key.as_deref().unwrap_or("-"),
            segment.tempo.unwrap_or(0.0),
            segment.density.unwrap_or(0.0),
        );
        println!("  {} {}", "memes".green(), memes.join(", "));
        if !segment.chords.is_empty() {
            let chords: Vec<String> = segment
                .chords
                .iter()
                .map(|c| format!("{}@{}", c.name, c.position))
                .collect();
            println!("  {} {}", "chords".green(), chords.join(", "));
        }
        for choice in &segment.choices {
            println!(
                "  {} {:?}: program {} picks {}",
                "choice".green(),
                choice.program_type,
                choice
                    .program_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".into()),
                choice.picks.len(),
            );
        }
        if let Some(waveform) = &segment.waveform_key {
            println!("  {} {waveform}", "waveform".green());
        }
    }
}
