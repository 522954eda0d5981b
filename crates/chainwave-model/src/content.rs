//! Library source material: programs, sequences, instruments, audios.
//!
//! One flat struct per entity type. Child entities are owned inline by
//! their parents (a sequence owns its chords; an instrument owns its
//! audios) since the engine only ever reads them through the parent.

use serde::{Deserialize, Serialize};

use crate::id::{AudioId, InstrumentId, LibraryId, ProgramId, SequenceId};
use crate::time::ChainMicros;

/// The musical role a program fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    /// Overarching song-type arc; supplies the running meme direction.
    Macro,
    /// Supplies key, tempo, density, chords for one segment.
    Main,
    /// Rhythm material.
    Beat,
    /// Melodic/detail material.
    Detail,
    /// Transition sound effects layer.
    Transition,
    /// Ambience layer.
    Background,
}

/// The sonic family of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    /// Percussive one-shots keyed by event name.
    Drum,
    /// Low-end tonal material.
    Bass,
    /// Sustained harmonic beds.
    Pad,
    /// Unpitched texture.
    Noise,
}

/// A chord within a program sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceChord {
    /// Beat position within the sequence. Raw library value; rounding
    /// happens when the chord is copied onto a segment.
    pub position: f64,
    /// Chord name.
    pub name: String,
}

/// A note/hit event within a program sequence, addressed to a voice by
/// name. Craft aligns these against instrument audio event names
/// phonetically to derive picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceEvent {
    /// Voice name this event is addressed to, e.g. `"Kick"`.
    pub voice: String,
    /// Beat position within the sequence.
    pub position: f64,
    /// Length in beats.
    pub length: f64,
    /// Velocity 0..=1.
    pub velocity: f64,
}

/// A binding placing a sequence at an offset within its program's arc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceBinding {
    /// The bound sequence.
    pub sequence_id: SequenceId,
    /// 0-based position within the program's arc.
    pub offset: u64,
}

/// One section of a program's material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSequence {
    /// Unique id.
    pub id: SequenceId,
    /// Display name.
    pub name: String,
    /// Musical key, e.g. `"C minor"`.
    pub key: String,
    /// Beats per minute.
    pub tempo: f64,
    /// Musical density 0..=1.
    pub density: f64,
    /// Length in beats; chords at or past this are never copied out.
    pub total: f64,
    /// Chords over the sequence.
    pub chords: Vec<SequenceChord>,
    /// Voice events over the sequence; empty for macro/main programs.
    pub events: Vec<SequenceEvent>,
}

/// A composable unit of musical source material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Unique id.
    pub id: ProgramId,
    /// Owning library.
    pub library_id: LibraryId,
    /// Display name.
    pub name: String,
    /// Role this program fills.
    pub program_type: ProgramType,
    /// Meme labels describing this program.
    pub memes: Vec<String>,
    /// Declared density 0..=1, the secondary selection tie-break.
    pub density: f64,
    /// Sections of material.
    pub sequences: Vec<ProgramSequence>,
    /// Arc positions of sequences.
    pub sequence_bindings: Vec<SequenceBinding>,
    /// Last content update, for ingest hash freshness.
    pub updated_at: ChainMicros,
}

impl Program {
    /// The sequence a binding refers to.
    pub fn sequence(&self, id: SequenceId) -> Option<&ProgramSequence> {
        self.sequences.iter().find(|s| s.id == id)
    }

    /// All bindings at one arc offset.
    pub fn bindings_at_offset(&self, offset: u64) -> Vec<&SequenceBinding> {
        self.sequence_bindings
            .iter()
            .filter(|b| b.offset == offset)
            .collect()
    }

    /// Greatest arc offset among this program's bindings, if any.
    pub fn max_binding_offset(&self) -> Option<u64> {
        self.sequence_bindings.iter().map(|b| b.offset).max()
    }
}

/// A playable audio sample owned by an instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentAudio {
    /// Unique id; picks reference it, since event names may repeat within
    /// an instrument.
    pub id: AudioId,
    /// Voice/event name this audio realizes, e.g. `"Kick"`.
    pub event: String,
    /// Gain 0..=1.
    pub volume: f64,
    /// Root pitch in Hz.
    pub pitch: f64,
    /// Length in beats when placed.
    pub length: f64,
}

/// A sound source the craft stages may arrange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Unique id.
    pub id: InstrumentId,
    /// Owning library.
    pub library_id: LibraryId,
    /// Display name.
    pub name: String,
    /// Sonic family.
    pub kind: InstrumentKind,
    /// Meme labels describing this instrument.
    pub memes: Vec<String>,
    /// Playable audios keyed by event name.
    pub audios: Vec<InstrumentAudio>,
    /// Last content update, for ingest hash freshness.
    pub updated_at: ChainMicros,
}

/// A collection of programs and instruments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    /// Unique id.
    pub id: LibraryId,
    /// Display name.
    pub name: String,
    /// Last content update, for ingest hash freshness.
    pub updated_at: ChainMicros,
}

/// Everything a store returns for one set of chain bindings; the raw
/// material an Ingest is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryContent {
    /// Libraries reachable from the bindings.
    pub libraries: Vec<Library>,
    /// Programs reachable from the bindings.
    pub programs: Vec<Program>,
    /// Instruments reachable from the bindings.
    pub instruments: Vec<Instrument>,
}
