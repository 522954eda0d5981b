//! Shared fixtures for the scheduler tests.

use chainwave_model::{
    AudioId, Instrument, InstrumentAudio, InstrumentId, InstrumentKind, LibraryContent, LibraryId,
    Program, ProgramId, ProgramSequence, ProgramType, SequenceBinding, SequenceId,
};

/// A minimal craftable library: one macro, one main, one drum kit.
pub(crate) fn craftable_content() -> LibraryContent {
    let sequence = ProgramSequence {
        id: SequenceId(11),
        name: "arc".into(),
        key: "C minor".into(),
        tempo: 120.0,
        density: 0.5,
        total: 16.0,
        chords: Vec::new(),
        events: Vec::new(),
    };
    let macro_program = Program {
        id: ProgramId(1),
        library_id: LibraryId(1),
        name: "macro".into(),
        program_type: ProgramType::Macro,
        memes: vec!["Cool".into()],
        density: 0.5,
        sequences: vec![sequence.clone()],
        sequence_bindings: vec![SequenceBinding {
            sequence_id: SequenceId(11),
            offset: 0,
        }],
        updated_at: 0,
    };
    let main_program = Program {
        id: ProgramId(2),
        program_type: ProgramType::Main,
        sequences: vec![ProgramSequence {
            id: SequenceId(21),
            ..sequence
        }],
        sequence_bindings: vec![SequenceBinding {
            sequence_id: SequenceId(21),
            offset: 0,
        }],
        ..macro_program.clone()
    };
    LibraryContent {
        libraries: Vec::new(),
        programs: vec![macro_program, main_program],
        instruments: vec![Instrument {
            id: InstrumentId(1),
            library_id: LibraryId(1),
            name: "kit".into(),
            kind: InstrumentKind::Drum,
            memes: vec!["Cool".into()],
            audios: vec![InstrumentAudio {
                id: AudioId(11),
                event: "Kick".into(),
                volume: 1.0,
                pitch: 60.0,
                length: 1.0,
            }],
            updated_at: 0,
        }],
    }
}
