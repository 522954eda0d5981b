//! Arrangement craft: the instrument-layer lanes.
//!
//! Beat, Detail, Transition, and Background all follow the same shape:
//! choose a program of the lane's type, choose an instrument of the lane's
//! kind, then align the chosen sequence's voice events against the
//! instrument's audios phonetically to derive picks. A lane with zero
//! eligible candidates stays silent rather than failing the segment.

use log::debug;

use chainwave_isometry::Isometry;
use chainwave_model::{
    round_position, EngineError, Instrument, InstrumentKind, Program, ProgramSequence,
    ProgramType, SegmentChoice, SegmentPick, SequenceBinding,
};

use crate::fabricator::Fabricator;
use crate::selection::pick_best;

/// Parameters distinguishing one arrangement lane from another.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LaneSpec {
    /// Program-type lane this stage fills.
    pub program_type: ProgramType,
    /// Instrument family the lane arranges.
    pub instrument_kind: InstrumentKind,
    /// Penalize (not forbid) repeating the prior segment's choice.
    pub avoid_prior_repeat: bool,
}

/// Runs one arrangement lane.
pub(crate) fn run(fab: &mut Fabricator, spec: LaneSpec) -> Result<(), EngineError> {
    if fab.config().muted_lanes.contains(&spec.program_type) {
        debug!("segment {} lane {:?} muted", fab.segment().id, spec.program_type);
        return Ok(());
    }

    let iso = fab.meme_isometry();
    let Some(program) = choose_program(fab, &iso, spec) else {
        debug!(
            "segment {} lane {:?} silent: no eligible program",
            fab.segment().id,
            spec.program_type
        );
        return Ok(());
    };
    let program = program.clone();
    let sequence = match select_sequence(fab, &program) {
        Ok(Some(sequence)) => sequence,
        Ok(None) => {
            debug!(
                "segment {} lane {:?} silent: program {} has no sequences",
                fab.segment().id,
                spec.program_type,
                program.id
            );
            return Ok(());
        }
        // A dangling reference in lane material silences the lane; only
        // the macro/main frame treats a missing entity as fatal.
        Err(EngineError::NotFound { kind, id }) => {
            debug!(
                "segment {} lane {:?} silent: {kind} {id} not found in program {}",
                fab.segment().id,
                spec.program_type,
                program.id
            );
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let instrument = choose_instrument(fab, &iso, spec).cloned();
    let picks = match &instrument {
        Some(instrument) => derive_picks(fab, &sequence, instrument),
        None => Vec::new(),
    };

    fab.add_choice(SegmentChoice {
        id: chainwave_model::ChoiceId(0),
        segment_id: fab.segment().id,
        program_type: spec.program_type,
        program_id: Some(program.id),
        sequence_id: Some(sequence.id),
        binding_offset: None,
        instrument_id: instrument.as_ref().map(|i| i.id),
        instrument_kind: instrument.as_ref().map(|i| i.kind),
        picks,
    });
    Ok(())
}

/// Scored program selection for the lane, honoring direct chain bindings
/// and the repeat penalty.
fn choose_program<'a>(
    fab: &'a Fabricator,
    iso: &Isometry,
    spec: LaneSpec,
) -> Option<&'a Program> {
    let per_match = fab.config().meme_match_score;
    // Repeating the immediately previous choice is biased against, not
    // hard-excluded, so a one-program library still fabricates.
    let penalty = per_match * 2.0;
    let avoided = spec
        .avoid_prior_repeat
        .then(|| fab.prior_choice(spec.program_type).and_then(|c| c.program_id))
        .flatten();

    let direct: Vec<&Program> = fab
        .chain()
        .bound_program_ids()
        .iter()
        .filter_map(|id| fab.ingest().program(*id))
        .filter(|p| p.program_type == spec.program_type)
        .collect();
    let pool = if direct.is_empty() {
        fab.ingest().programs_of_type(spec.program_type)
    } else {
        direct
    };
    let eligible: Vec<&Program> = pool
        .into_iter()
        .filter(|p| iso.is_allowed(&p.memes))
        .collect();

    pick_best(
        &eligible,
        |p| {
            let mut score = iso.score(&p.memes, per_match);
            if avoided == Some(p.id) {
                score -= penalty;
            }
            score
        },
        |p| p.density,
        |p| p.id.0,
    )
}

/// Scored instrument selection for the lane.
fn choose_instrument<'a>(
    fab: &'a Fabricator,
    iso: &Isometry,
    spec: LaneSpec,
) -> Option<&'a Instrument> {
    let per_match = fab.config().meme_match_score;
    let penalty = per_match * 2.0;
    let avoided = spec
        .avoid_prior_repeat
        .then(|| {
            fab.prior_choice(spec.program_type)
                .and_then(|c| c.instrument_id)
        })
        .flatten();

    let direct: Vec<&Instrument> = fab
        .chain()
        .bound_instrument_ids()
        .iter()
        .filter_map(|id| fab.ingest().instrument(*id))
        .filter(|i| i.kind == spec.instrument_kind)
        .collect();
    let pool = if direct.is_empty() {
        fab.ingest().instruments_of_kind(spec.instrument_kind)
    } else {
        direct
    };
    let eligible: Vec<&Instrument> = pool
        .into_iter()
        .filter(|i| iso.is_allowed(&i.memes))
        .collect();

    pick_best(
        &eligible,
        |i| {
            let mut score = iso.score(&i.memes, per_match);
            if avoided == Some(i.id) {
                score -= penalty;
            }
            score
        },
        |_| 0.0,
        |i| i.id.0,
    )
}

/// Picks the lane program's sequence: a random binding at arc offset 0
/// when bindings exist, otherwise the program's first sequence.
fn select_sequence(
    fab: &mut Fabricator,
    program: &Program,
) -> Result<Option<ProgramSequence>, EngineError> {
    let at_zero: Vec<SequenceBinding> = program
        .bindings_at_offset(0)
        .into_iter()
        .cloned()
        .collect();
    if !at_zero.is_empty() {
        let index = if at_zero.len() == 1 {
            0
        } else {
            fab.random_index(at_zero.len())
        };
        let binding = &at_zero[index];
        let sequence = program
            .sequence(binding.sequence_id)
            .ok_or_else(|| EngineError::not_found("sequence", binding.sequence_id))?;
        return Ok(Some(sequence.clone()));
    }
    Ok(program.sequences.first().cloned())
}

/// Aligns sequence events to instrument audios by phonetic isometry.
///
/// Each event's voice name selects the best-matching audio; an event whose
/// voice matches no audio at all is skipped, leaving that voice silent.
fn derive_picks(
    fab: &Fabricator,
    sequence: &ProgramSequence,
    instrument: &Instrument,
) -> Vec<SegmentPick> {
    let beat_limit = fab
        .segment()
        .total_beats()
        .unwrap_or(sequence.total)
        .min(sequence.total);

    let mut picks = Vec::new();
    for event in &sequence.events {
        if event.position >= beat_limit {
            continue;
        }
        let voice_iso = Isometry::of_events([event.voice.as_str()]);
        let indexed: Vec<(usize, f64)> = instrument
            .audios
            .iter()
            .enumerate()
            .map(|(i, audio)| (i, voice_iso.score([audio.event.as_str()], 1.0)))
            .collect();
        let indexed_refs: Vec<&(usize, f64)> = indexed.iter().collect();
        let best = pick_best(&indexed_refs, |(_, s)| *s, |_| 0.0, |(i, _)| *i as u64);
        let Some((audio_index, score)) = best else {
            continue;
        };
        if *score <= 0.0 {
            continue;
        }
        let audio = &instrument.audios[*audio_index];
        picks.push(SegmentPick {
            event: audio.event.clone(),
            position: round_position(event.position),
            length: event.length.min(audio.length),
            velocity: event.velocity * audio.volume,
            audio_instrument: instrument.id,
            audio_id: audio.id,
        });
    }
    picks
}
