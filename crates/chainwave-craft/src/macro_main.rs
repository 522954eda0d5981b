//! MacroMain craft: the segment's musical frame.
//!
//! Chooses the macro-program (the overarching song-type arc) and its
//! current position, then the main program/sequence supplying key, tempo,
//! density, memes, and chords. Continuity is preferred over fuzzy matching:
//! a macro-program the prior segment committed to and has not finished is
//! continued at its next arc offset rather than re-chosen.

use log::debug;

use chainwave_isometry::{Isometry, NEGATION_MARKER};
use chainwave_model::{
    EngineError, Program, ProgramId, ProgramType, SegmentChoice, SegmentChord, SequenceBinding,
};

use crate::fabricator::Fabricator;
use crate::selection::pick_best;

/// Runs the MacroMain stage.
pub(crate) fn run(fab: &mut Fabricator) -> Result<(), EngineError> {
    let (macro_id, macro_offset) = choose_macro(fab)?;
    let macro_program = fab
        .ingest()
        .program(macro_id)
        .ok_or_else(|| EngineError::not_found("macro program", macro_id))?
        .clone();
    let macro_binding = select_binding_at(fab, &macro_program, macro_offset)?;
    let macro_sequence = macro_program
        .sequence(macro_binding.sequence_id)
        .ok_or_else(|| EngineError::not_found("macro sequence", macro_binding.sequence_id))?
        .clone();

    fab.add_choice(SegmentChoice {
        id: chainwave_model::ChoiceId(0),
        segment_id: fab.segment().id,
        program_type: ProgramType::Macro,
        program_id: Some(macro_program.id),
        sequence_id: Some(macro_sequence.id),
        binding_offset: Some(macro_binding.offset),
        instrument_id: None,
        instrument_kind: None,
        picks: Vec::new(),
    });

    let macro_continued = is_continuation(fab, macro_program.id, macro_offset);
    let (main_id, main_offset) = choose_main(fab, &macro_program, macro_continued)?;
    let main_program = fab
        .ingest()
        .program(main_id)
        .ok_or_else(|| EngineError::not_found("main program", main_id))?
        .clone();
    let main_binding = select_binding_at(fab, &main_program, main_offset)?;
    let main_sequence = main_program
        .sequence(main_binding.sequence_id)
        .ok_or_else(|| EngineError::not_found("main sequence", main_binding.sequence_id))?
        .clone();

    fab.add_choice(SegmentChoice {
        id: chainwave_model::ChoiceId(0),
        segment_id: fab.segment().id,
        program_type: ProgramType::Main,
        program_id: Some(main_program.id),
        sequence_id: Some(main_sequence.id),
        binding_offset: Some(main_binding.offset),
        instrument_id: None,
        instrument_kind: None,
        picks: Vec::new(),
    });

    // Memes from both programs form the segment's running set. A prior
    // segment's negations stay in force: committing the new set must not
    // re-admit labels the prior forbade.
    fab.add_memes(macro_program.memes.iter().cloned());
    fab.add_memes(main_program.memes.iter().cloned());
    let carried: Vec<String> = fab
        .prior()
        .map(|prior| {
            prior
                .memes
                .iter()
                .filter(|m| m.starts_with(NEGATION_MARKER))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    fab.add_memes(carried);

    let density = (macro_sequence.density + main_sequence.density) / 2.0;
    fab.commit_musical_frame(
        &main_sequence.key,
        main_sequence.tempo,
        density,
        main_sequence.total,
    );

    // Chords at or past the sequence's end never sound; drop them here.
    for chord in &main_sequence.chords {
        if chord.position < main_sequence.total {
            fab.add_chord(SegmentChord::new(chord.position, chord.name.clone()));
        }
    }

    debug!(
        "segment {} macro={} main={} key={} tempo={}",
        fab.segment().id,
        macro_program.id,
        main_program.id,
        main_sequence.key,
        main_sequence.tempo
    );
    Ok(())
}

/// True when this segment continues the prior segment's macro choice.
fn is_continuation(fab: &Fabricator, program_id: ProgramId, offset: u64) -> bool {
    fab.prior_choice(ProgramType::Macro)
        .map(|prior| {
            prior.program_id == Some(program_id)
                && prior.binding_offset.map(|o| o + 1) == Some(offset)
        })
        .unwrap_or(false)
}

/// Macro choice: continuity first, then isometry-scored selection.
fn choose_macro(fab: &mut Fabricator) -> Result<(ProgramId, u64), EngineError> {
    if let Some(prior) = fab.prior_choice(ProgramType::Macro) {
        if let (Some(program_id), Some(offset)) = (prior.program_id, prior.binding_offset) {
            if let Some(program) = fab.ingest().program(program_id) {
                // A gap in the binding offsets ends the arc early.
                if !program.bindings_at_offset(offset + 1).is_empty() {
                    return Ok((program_id, offset + 1));
                }
            }
        }
    }
    let chosen = choose_program(fab, ProgramType::Macro)?;
    Ok((chosen, 0))
}

/// Main choice: continue the prior main while the macro continues;
/// otherwise isometry-scored against running memes plus the macro's memes.
fn choose_main(
    fab: &mut Fabricator,
    macro_program: &Program,
    macro_continued: bool,
) -> Result<(ProgramId, u64), EngineError> {
    if macro_continued {
        if let Some(prior) = fab.prior_choice(ProgramType::Main) {
            if let (Some(program_id), Some(offset)) = (prior.program_id, prior.binding_offset) {
                if let Some(program) = fab.ingest().program(program_id) {
                    if !program.bindings_at_offset(offset + 1).is_empty() {
                        return Ok((program_id, offset + 1));
                    }
                }
            }
        }
    }

    let mut iso = fab.meme_isometry();
    for meme in &macro_program.memes {
        iso.add(meme);
    }
    let chosen = choose_program_scored(fab, ProgramType::Main, &iso)?;
    Ok((chosen, 0))
}

fn choose_program(fab: &mut Fabricator, program_type: ProgramType) -> Result<ProgramId, EngineError> {
    let iso = fab.meme_isometry();
    choose_program_scored(fab, program_type, &iso)
}

/// Scored selection over the candidate pool for one program type.
///
/// Chain bindings that directly specify programs of this type override the
/// library pool entirely. Candidates carrying a meme the running set
/// negates are excluded; the rest score by isometry match with declared
/// density as the secondary tie-break and lowest id as the final one.
fn choose_program_scored(
    fab: &Fabricator,
    program_type: ProgramType,
    iso: &Isometry,
) -> Result<ProgramId, EngineError> {
    let per_match = fab.config().meme_match_score;
    let bound: Vec<ProgramId> = fab.chain().bound_program_ids();
    let pool: Vec<&Program> = {
        let direct: Vec<&Program> = bound
            .iter()
            .filter_map(|id| fab.ingest().program(*id))
            .filter(|p| p.program_type == program_type)
            .collect();
        if direct.is_empty() {
            fab.ingest().programs_of_type(program_type)
        } else {
            direct
        }
    };
    let eligible: Vec<&Program> = pool
        .into_iter()
        .filter(|p| iso.is_allowed(&p.memes))
        .collect();

    pick_best(
        &eligible,
        |p| iso.score(&p.memes, per_match),
        |p| p.density,
        |p| p.id.0,
    )
    .map(|p| p.id)
    .ok_or_else(|| EngineError::not_found("program", format!("{program_type:?}")))
}

/// Picks one sequence binding at an arc offset, uniformly at random from
/// the segment-seeded RNG when several sequences share the offset.
fn select_binding_at(
    fab: &mut Fabricator,
    program: &Program,
    offset: u64,
) -> Result<SequenceBinding, EngineError> {
    let at_offset: Vec<SequenceBinding> = program
        .bindings_at_offset(offset)
        .into_iter()
        .cloned()
        .collect();
    if at_offset.is_empty() {
        return Err(EngineError::not_found(
            "sequence binding",
            format!("program {} offset {offset}", program.id),
        ));
    }
    let index = if at_offset.len() == 1 {
        0
    } else {
        fab.random_index(at_offset.len())
    };
    Ok(at_offset[index].clone())
}
