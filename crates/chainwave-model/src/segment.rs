//! Segments, choices, chords, and picks.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::content::{InstrumentKind, ProgramType};
use crate::id::{AudioId, ChainId, ChoiceId, InstrumentId, ProgramId, SegmentId, SequenceId};
use crate::state::SegmentState;
use crate::time::ChainMicros;

/// Decimal places kept on chord and pick positions.
///
/// Positions arrive from library content with arbitrary float noise;
/// rounding at write time keeps repeated reads stable. The value is fixed
/// rather than configured so stored segments stay comparable.
pub const POSITION_DECIMALS: u32 = 2;

/// Rounds a beat position to [`POSITION_DECIMALS`] decimal places.
///
/// Idempotent: re-rounding a stored value does not drift it further.
pub fn round_position(position: f64) -> f64 {
    let factor = 10f64.powi(POSITION_DECIMALS as i32);
    (position * factor).round() / factor
}

/// A chord sounding at a position within a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChord {
    /// Beat position, rounded per [`round_position`].
    pub position: f64,
    /// Chord name, e.g. `"C minor 7"`.
    pub name: String,
}

impl SegmentChord {
    /// Creates a chord with its position rounded.
    pub fn new(position: f64, name: impl Into<String>) -> Self {
        Self {
            position: round_position(position),
            name: name.into(),
        }
    }
}

/// One concrete audio-event placement derived from a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPick {
    /// Voice/audio event name, e.g. `"Kick"`.
    pub event: String,
    /// Beat position within the segment, rounded per [`round_position`].
    pub position: f64,
    /// Length in beats.
    pub length: f64,
    /// Velocity 0..=1.
    pub velocity: f64,
    /// The instrument owning the realizing audio.
    pub audio_instrument: InstrumentId,
    /// The exact audio realizing this pick.
    pub audio_id: AudioId,
}

/// A segment's selection of one program (and sequence) or one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentChoice {
    /// Unique id within the segment.
    pub id: ChoiceId,
    /// Owning segment.
    pub segment_id: SegmentId,
    /// Program-type lane this choice fills.
    pub program_type: ProgramType,
    /// Chosen program, when the lane is program-driven.
    pub program_id: Option<ProgramId>,
    /// Chosen sequence within the program.
    pub sequence_id: Option<SequenceId>,
    /// Sequence-binding offset the choice sits at, for macro continuity.
    pub binding_offset: Option<u64>,
    /// Chosen instrument, when the lane is instrument-driven.
    pub instrument_id: Option<InstrumentId>,
    /// Kind of the chosen instrument.
    pub instrument_kind: Option<InstrumentKind>,
    /// Concrete audio-event placements.
    pub picks: Vec<SegmentPick>,
}

/// One time-bounded slice of a chain's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique id.
    pub id: SegmentId,
    /// Owning chain.
    pub chain_id: ChainId,
    /// 0-based position in the chain; contiguous, strictly increasing.
    pub offset: u64,
    /// Lifecycle state.
    pub state: SegmentState,
    /// Start of this segment, in chain micros.
    pub begin_at: ChainMicros,
    /// Length of this segment, in micros.
    pub duration: ChainMicros,
    /// Musical key, committed by MacroMainCraft.
    pub key: Option<String>,
    /// Beats per minute.
    pub tempo: Option<f64>,
    /// Musical density 0..=1.
    pub density: Option<f64>,
    /// Running meme set; sorted and deduplicated by construction.
    pub memes: BTreeSet<String>,
    /// Chords chosen for this segment.
    pub chords: Vec<SegmentChord>,
    /// Choices made for this segment.
    pub choices: Vec<SegmentChoice>,
    /// Transient-failure retries consumed so far.
    pub retry_count: u32,
    /// The state this segment was claimed out of; present only while the
    /// segment sits in `Claimed`, so an abandoned claim can be released
    /// back to where work resumes.
    pub claimed_from: Option<SegmentState>,
    /// Waveform reference key recorded on successful dub.
    pub waveform_key: Option<String>,
    /// Failure context, retained for diagnosis.
    pub error_message: Option<String>,
}

impl Segment {
    /// Creates a planned segment at an offset.
    pub fn planned(id: SegmentId, chain_id: ChainId, offset: u64, begin_at: ChainMicros) -> Self {
        Self {
            id,
            chain_id,
            offset,
            state: SegmentState::Planned,
            begin_at,
            duration: 0,
            key: None,
            tempo: None,
            density: None,
            memes: BTreeSet::new(),
            chords: Vec::new(),
            choices: Vec::new(),
            retry_count: 0,
            claimed_from: None,
            waveform_key: None,
            error_message: None,
        }
    }

    /// End of this segment in chain micros.
    pub fn end_at(&self) -> ChainMicros {
        self.begin_at + self.duration
    }

    /// The choice filling a program-type lane, if made.
    pub fn choice_of_type(&self, program_type: ProgramType) -> Option<&SegmentChoice> {
        self.choices.iter().find(|c| c.program_type == program_type)
    }

    /// Total beats covered by this segment at its tempo, if committed.
    pub fn total_beats(&self) -> Option<f64> {
        let tempo = self.tempo?;
        if tempo <= 0.0 {
            return None;
        }
        Some(crate::time::seconds_from_micros(self.duration) * tempo / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_round_to_fixed_precision() {
        assert_eq!(round_position(1.25179957), 1.25);
        assert_eq!(round_position(0.333333), 0.33);
        assert_eq!(round_position(0.125), 0.13);
    }

    #[test]
    fn rounding_is_stable_on_repeated_reads() {
        let once = round_position(1.25179957);
        assert_eq!(round_position(once), once);
        assert_eq!(round_position(round_position(once)), once);
    }

    #[test]
    fn chord_construction_rounds_position() {
        let chord = SegmentChord::new(4.00000071, "G major");
        assert_eq!(chord.position, 4.0);
        assert_eq!(chord.name, "G major");
    }

    #[test]
    fn end_at_is_begin_plus_duration() {
        let mut segment = Segment::planned(SegmentId(1), ChainId(1), 0, 10_000_000);
        segment.duration = 30_000_000;
        assert_eq!(segment.end_at(), 40_000_000);
    }
}
