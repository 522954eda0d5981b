//! The built-in demo library.
//!
//! A small but complete body of source material: two macro arcs, two main
//! programs, rhythm and detail material, and instruments for every lane,
//! so a demo chain fabricates with all craft stages active.

use chainwave_model::{
    AudioId, Instrument, InstrumentAudio, InstrumentId, InstrumentKind, Library, LibraryContent,
    LibraryId, Program, ProgramId, ProgramSequence, ProgramType, SequenceBinding, SequenceChord,
    SequenceEvent, SequenceId,
};

/// The demo library id; bind chains to this.
pub const DEMO_LIBRARY: LibraryId = LibraryId(1);

fn event(voice: &str, position: f64, length: f64, velocity: f64) -> SequenceEvent {
    SequenceEvent {
        voice: voice.into(),
        position,
        length,
        velocity,
    }
}

fn audio(id: u64, event: &str, volume: f64, pitch: f64, length: f64) -> InstrumentAudio {
    InstrumentAudio {
        id: AudioId(id),
        event: event.into(),
        volume,
        pitch,
        length,
    }
}

/// Builds the demo library content.
pub fn demo_content() -> LibraryContent {
    let programs = vec![
        Program {
            id: ProgramId(1),
            library_id: DEMO_LIBRARY,
            name: "Daybreak Arc".into(),
            program_type: ProgramType::Macro,
            memes: vec!["Bright".into(), "Warm".into()],
            density: 0.5,
            sequences: vec![
                ProgramSequence {
                    id: SequenceId(11),
                    name: "dawn".into(),
                    key: "C major".into(),
                    tempo: 110.0,
                    density: 0.4,
                    total: 16.0,
                    chords: Vec::new(),
                    events: Vec::new(),
                },
                ProgramSequence {
                    id: SequenceId(12),
                    name: "noon".into(),
                    key: "G major".into(),
                    tempo: 118.0,
                    density: 0.6,
                    total: 16.0,
                    chords: Vec::new(),
                    events: Vec::new(),
                },
            ],
            sequence_bindings: vec![
                SequenceBinding {
                    sequence_id: SequenceId(11),
                    offset: 0,
                },
                SequenceBinding {
                    sequence_id: SequenceId(12),
                    offset: 1,
                },
            ],
            updated_at: 0,
        },
        Program {
            id: ProgramId(2),
            library_id: DEMO_LIBRARY,
            name: "Nightfall Arc".into(),
            program_type: ProgramType::Macro,
            memes: vec!["Dark".into(), "Cold".into()],
            density: 0.6,
            sequences: vec![ProgramSequence {
                id: SequenceId(21),
                name: "dusk".into(),
                key: "A minor".into(),
                tempo: 92.0,
                density: 0.7,
                total: 16.0,
                chords: Vec::new(),
                events: Vec::new(),
            }],
            sequence_bindings: vec![SequenceBinding {
                sequence_id: SequenceId(21),
                offset: 0,
            }],
            updated_at: 0,
        },
        Program {
            id: ProgramId(3),
            library_id: DEMO_LIBRARY,
            name: "Warm Main".into(),
            program_type: ProgramType::Main,
            memes: vec!["Warm".into()],
            density: 0.5,
            sequences: vec![ProgramSequence {
                id: SequenceId(31),
                name: "warm".into(),
                key: "C major".into(),
                tempo: 112.0,
                density: 0.5,
                total: 32.0,
                chords: vec![
                    SequenceChord {
                        position: 0.0,
                        name: "C major".into(),
                    },
                    SequenceChord {
                        position: 8.0,
                        name: "F major".into(),
                    },
                    SequenceChord {
                        position: 16.0,
                        name: "A minor".into(),
                    },
                    SequenceChord {
                        position: 24.0,
                        name: "G major".into(),
                    },
                ],
                events: Vec::new(),
            }],
            sequence_bindings: vec![SequenceBinding {
                sequence_id: SequenceId(31),
                offset: 0,
            }],
            updated_at: 0,
        },
        Program {
            id: ProgramId(4),
            library_id: DEMO_LIBRARY,
            name: "Cold Main".into(),
            program_type: ProgramType::Main,
            memes: vec!["Cold".into(), "Dark".into()],
            density: 0.6,
            sequences: vec![ProgramSequence {
                id: SequenceId(41),
                name: "cold".into(),
                key: "A minor".into(),
                tempo: 94.0,
                density: 0.7,
                total: 32.0,
                chords: vec![
                    SequenceChord {
                        position: 0.0,
                        name: "A minor".into(),
                    },
                    SequenceChord {
                        position: 16.0,
                        name: "E minor".into(),
                    },
                ],
                events: Vec::new(),
            }],
            sequence_bindings: vec![SequenceBinding {
                sequence_id: SequenceId(41),
                offset: 0,
            }],
            updated_at: 0,
        },
        Program {
            id: ProgramId(5),
            library_id: DEMO_LIBRARY,
            name: "Four on the Floor".into(),
            program_type: ProgramType::Beat,
            memes: vec!["Warm".into(), "Bright".into()],
            density: 0.5,
            sequences: vec![ProgramSequence {
                id: SequenceId(51),
                name: "floor".into(),
                key: "C".into(),
                tempo: 112.0,
                density: 0.5,
                total: 4.0,
                chords: Vec::new(),
                events: vec![
                    event("Kick", 0.0, 1.0, 1.0),
                    event("Hihat", 0.5, 0.5, 0.6),
                    event("Snare", 1.0, 1.0, 0.9),
                    event("Hihat", 1.5, 0.5, 0.6),
                    event("Kick", 2.0, 1.0, 1.0),
                    event("Hihat", 2.5, 0.5, 0.6),
                    event("Snare", 3.0, 1.0, 0.9),
                    event("Hihat", 3.5, 0.5, 0.6),
                ],
            }],
            sequence_bindings: vec![SequenceBinding {
                sequence_id: SequenceId(51),
                offset: 0,
            }],
            updated_at: 0,
        },
        Program {
            id: ProgramId(6),
            library_id: DEMO_LIBRARY,
            name: "Halfbeat".into(),
            program_type: ProgramType::Beat,
            memes: vec!["Dark".into(), "Cold".into()],
            density: 0.4,
            sequences: vec![ProgramSequence {
                id: SequenceId(61),
                name: "half".into(),
                key: "C".into(),
                tempo: 94.0,
                density: 0.4,
                total: 4.0,
                chords: Vec::new(),
                events: vec![
                    event("Kick", 0.0, 1.0, 1.0),
                    event("Snare", 2.0, 1.0, 0.8),
                ],
            }],
            sequence_bindings: vec![SequenceBinding {
                sequence_id: SequenceId(61),
                offset: 0,
            }],
            updated_at: 0,
        },
        Program {
            id: ProgramId(7),
            library_id: DEMO_LIBRARY,
            name: "Walking Line".into(),
            program_type: ProgramType::Detail,
            memes: vec!["Warm".into()],
            density: 0.5,
            sequences: vec![ProgramSequence {
                id: SequenceId(71),
                name: "walk".into(),
                key: "C".into(),
                tempo: 112.0,
                density: 0.5,
                total: 4.0,
                chords: Vec::new(),
                events: vec![
                    event("Bass", 0.0, 1.0, 0.9),
                    event("Bass", 1.0, 1.0, 0.7),
                    event("Bass", 2.0, 1.0, 0.8),
                    event("Bass", 3.0, 1.0, 0.7),
                ],
            }],
            sequence_bindings: vec![SequenceBinding {
                sequence_id: SequenceId(71),
                offset: 0,
            }],
            updated_at: 0,
        },
    ];

    let instruments = vec![
        Instrument {
            id: InstrumentId(1),
            library_id: DEMO_LIBRARY,
            name: "House Kit".into(),
            kind: InstrumentKind::Drum,
            memes: vec!["Warm".into()],
            audios: vec![
                audio(11, "Kick", 1.0, 55.0, 1.0),
                audio(12, "Snare", 0.9, 200.0, 0.8),
                audio(13, "Hihat", 0.6, 8000.0, 0.3),
            ],
            updated_at: 0,
        },
        Instrument {
            id: InstrumentId(2),
            library_id: DEMO_LIBRARY,
            name: "Round Bass".into(),
            kind: InstrumentKind::Bass,
            memes: vec!["Warm".into()],
            audios: vec![audio(21, "Bass", 0.9, 41.0, 1.0)],
            updated_at: 0,
        },
        Instrument {
            id: InstrumentId(3),
            library_id: DEMO_LIBRARY,
            name: "Slow Pad".into(),
            kind: InstrumentKind::Pad,
            memes: vec!["Bright".into()],
            audios: vec![audio(31, "Pad", 0.7, 220.0, 4.0)],
            updated_at: 0,
        },
    ];

    LibraryContent {
        libraries: vec![Library {
            id: DEMO_LIBRARY,
            name: "Demo Library".into(),
            updated_at: 0,
        }],
        programs,
        instruments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_library_covers_every_required_lane() {
        let content = demo_content();
        for program_type in [ProgramType::Macro, ProgramType::Main, ProgramType::Beat] {
            assert!(
                content
                    .programs
                    .iter()
                    .any(|p| p.program_type == program_type),
                "missing {program_type:?} program"
            );
        }
        assert!(content
            .instruments
            .iter()
            .any(|i| i.kind == InstrumentKind::Drum));
    }
}
