//! Free validation functions over entities.
//!
//! Craft output must pass [`validate_segment`] before a segment may leave
//! `Crafting`; stores are expected to call these before persisting.

use crate::chain::Chain;
use crate::content::{Instrument, Program};
use crate::error::ValidationError;
use crate::segment::Segment;
use crate::state::SegmentState;

/// Validates a chain's structural fields.
pub fn validate_chain(chain: &Chain) -> Result<(), ValidationError> {
    if chain.bindings.is_empty() {
        return Err(ValidationError::new(
            "chain.bindings",
            "chain must bind at least one library, program, or instrument",
        ));
    }
    if let Some(stop_at) = chain.stop_at {
        if stop_at <= chain.start_at {
            return Err(ValidationError::new(
                "chain.stop_at",
                "stop time must be after start time",
            ));
        }
    }
    Ok(())
}

/// Validates a segment's structural fields for its current state.
///
/// Timing and musical fields are only required once craft has committed
/// them, so a `Planned` segment needs nothing beyond identity and offset
/// ordering invariants enforced elsewhere.
pub fn validate_segment(segment: &Segment) -> Result<(), ValidationError> {
    if segment.duration < 0 {
        return Err(ValidationError::new(
            "segment.duration",
            "duration must not be negative",
        ));
    }
    let crafted = !matches!(
        segment.state,
        SegmentState::Planned | SegmentState::Claimed | SegmentState::Crafting
    );
    if crafted && segment.state != SegmentState::Failed {
        if segment.key.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::new(
                "segment.key",
                "crafted segment must carry a musical key",
            ));
        }
        match segment.tempo {
            Some(tempo) if tempo > 0.0 => {}
            _ => {
                return Err(ValidationError::new(
                    "segment.tempo",
                    "crafted segment must carry a positive tempo",
                ))
            }
        }
        if segment.duration == 0 {
            return Err(ValidationError::new(
                "segment.duration",
                "crafted segment must have a positive duration",
            ));
        }
    }
    for (i, chord) in segment.chords.iter().enumerate() {
        if chord.name.trim().is_empty() {
            return Err(ValidationError::new(
                format!("segment.chords[{i}].name"),
                "chord name must not be empty",
            ));
        }
        if chord.position < 0.0 {
            return Err(ValidationError::new(
                format!("segment.chords[{i}].position"),
                "chord position must not be negative",
            ));
        }
    }
    Ok(())
}

/// Validates a library program.
pub fn validate_program(program: &Program) -> Result<(), ValidationError> {
    if program.name.trim().is_empty() {
        return Err(ValidationError::new(
            "program.name",
            "program name must not be empty",
        ));
    }
    for binding in &program.sequence_bindings {
        if program.sequence(binding.sequence_id).is_none() {
            return Err(ValidationError::new(
                "program.sequence_bindings",
                format!(
                    "binding at offset {} references unknown sequence {}",
                    binding.offset, binding.sequence_id
                ),
            ));
        }
    }
    for sequence in &program.sequences {
        if sequence.tempo <= 0.0 {
            return Err(ValidationError::new(
                "program.sequences.tempo",
                format!("sequence \"{}\" must have a positive tempo", sequence.name),
            ));
        }
        if sequence.total <= 0.0 {
            return Err(ValidationError::new(
                "program.sequences.total",
                format!("sequence \"{}\" must span at least one beat", sequence.name),
            ));
        }
    }
    Ok(())
}

/// Validates a library instrument.
pub fn validate_instrument(instrument: &Instrument) -> Result<(), ValidationError> {
    if instrument.name.trim().is_empty() {
        return Err(ValidationError::new(
            "instrument.name",
            "instrument name must not be empty",
        ));
    }
    for (i, audio) in instrument.audios.iter().enumerate() {
        if audio.event.trim().is_empty() {
            return Err(ValidationError::new(
                format!("instrument.audios[{i}].event"),
                "audio event name must not be empty",
            ));
        }
    }
    Ok(())
}
