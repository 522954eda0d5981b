//! Per-segment working context for the craft stages.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use chainwave_ingest::Ingest;
use chainwave_isometry::Isometry;
use chainwave_model::{
    Chain, ChoiceId, EngineConfig, ProgramType, Segment, SegmentChoice, SegmentChord,
    MICROS_PER_SECOND,
};

/// Derives the deterministic RNG seed for one segment's fabrication.
///
/// ```text
/// seed = truncate_u64(BLAKE3("chain:<id>|offset:<offset>"))
/// ```
fn derive_segment_seed(chain: &Chain, offset: u64) -> u64 {
    let material = format!("chain:{}|offset:{}", chain.id, offset);
    let hash = blake3::hash(material.as_bytes());
    let bytes: [u8; 8] = hash.as_bytes()[..8].try_into().expect("blake3 yields 32 bytes");
    u64::from_le_bytes(bytes)
}

/// The working context for fabricating one segment.
///
/// Owns the segment being built, shares the Ingest for the chain's current
/// bindings, and reads the immediately preceding segment for continuity.
/// Craft stages accumulate choices, chords, and memes through it; the
/// finished segment is recovered with [`Fabricator::into_segment`].
pub struct Fabricator {
    chain: Chain,
    segment: Segment,
    prior: Option<Segment>,
    ingest: Arc<Ingest>,
    config: EngineConfig,
    rng: Pcg32,
    next_choice_id: u64,
}

impl Fabricator {
    /// Builds a fabricator for a segment entering `Crafting`.
    pub fn new(
        chain: Chain,
        segment: Segment,
        prior: Option<Segment>,
        ingest: Arc<Ingest>,
        config: EngineConfig,
    ) -> Self {
        let seed = derive_segment_seed(&chain, segment.offset);
        Self {
            chain,
            segment,
            prior,
            ingest,
            config,
            rng: Pcg32::seed_from_u64(seed),
            next_choice_id: 0,
        }
    }

    /// The chain being fabricated.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// The segment under construction.
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// The immediately preceding segment, if any.
    pub fn prior(&self) -> Option<&Segment> {
        self.prior.as_ref()
    }

    /// The shared library view for this fabrication.
    pub fn ingest(&self) -> &Ingest {
        &self.ingest
    }

    /// Engine configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The running meme set: this segment's memes once MacroMain has
    /// committed them, otherwise the prior segment's.
    pub fn running_memes(&self) -> BTreeSet<String> {
        if !self.segment.memes.is_empty() {
            return self.segment.memes.clone();
        }
        self.prior
            .as_ref()
            .map(|p| p.memes.clone())
            .unwrap_or_default()
    }

    /// Stem-mode isometry over the running meme set.
    pub fn meme_isometry(&self) -> Isometry {
        Isometry::of_memes(self.running_memes())
    }

    /// The prior segment's choice for a program-type lane, if any.
    pub fn prior_choice(&self, program_type: ProgramType) -> Option<&SegmentChoice> {
        self.prior.as_ref()?.choice_of_type(program_type)
    }

    /// Records a choice, assigning its per-segment id.
    pub fn add_choice(&mut self, mut choice: SegmentChoice) -> ChoiceId {
        self.next_choice_id += 1;
        choice.id = ChoiceId(self.next_choice_id);
        choice.segment_id = self.segment.id;
        let id = choice.id;
        self.segment.choices.push(choice);
        id
    }

    /// Records a chord (position already rounded by [`SegmentChord::new`]).
    pub fn add_chord(&mut self, chord: SegmentChord) {
        self.segment.chords.push(chord);
    }

    /// Merges memes into the segment's running set.
    pub fn add_memes<I, S>(&mut self, memes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for meme in memes {
            self.segment.memes.insert(meme.into());
        }
    }

    /// Commits the musical frame chosen by MacroMain: key, tempo, density,
    /// and the duration implied by `total_beats` at that tempo.
    pub fn commit_musical_frame(&mut self, key: &str, tempo: f64, density: f64, total_beats: f64) {
        self.segment.key = Some(key.trim().to_string());
        self.segment.tempo = Some(tempo);
        self.segment.density = Some(density);
        let seconds = total_beats * 60.0 / tempo;
        self.segment.duration = (seconds * MICROS_PER_SECOND as f64).round() as i64;
    }

    /// Uniform random index below `len`, from the segment-seeded RNG.
    pub fn random_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.rng.gen_range(0..len)
    }

    /// Consumes the fabricator, yielding the finished segment.
    pub fn into_segment(self) -> Segment {
        self.segment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainwave_ingest::AccessScope;
    use chainwave_model::{
        ChainBinding, ChainId, ChainType, LibraryContent, LibraryId, SegmentId,
    };

    fn fabricator(offset: u64) -> Fabricator {
        let chain = Chain::new(ChainId(1), ChainType::Production, 0)
            .with_binding(ChainBinding::library(LibraryId(1)));
        let segment = Segment::planned(SegmentId(offset + 1), ChainId(1), offset, 0);
        let ingest = Arc::new(Ingest::from_content(
            &AccessScope::new("test"),
            &chain.bindings,
            LibraryContent::default(),
        ));
        Fabricator::new(chain, segment, None, ingest, EngineConfig::default())
    }

    #[test]
    fn seed_is_stable_per_chain_and_offset() {
        let chain = Chain::new(ChainId(1), ChainType::Production, 0);
        assert_eq!(
            derive_segment_seed(&chain, 3),
            derive_segment_seed(&chain, 3)
        );
        assert_ne!(
            derive_segment_seed(&chain, 3),
            derive_segment_seed(&chain, 4)
        );
        let other = Chain::new(ChainId(2), ChainType::Production, 0);
        assert_ne!(derive_segment_seed(&chain, 3), derive_segment_seed(&other, 3));
    }

    #[test]
    fn random_choices_reproduce_for_same_segment() {
        let mut a = fabricator(5);
        let mut b = fabricator(5);
        let draws_a: Vec<usize> = (0..8).map(|_| a.random_index(10)).collect();
        let draws_b: Vec<usize> = (0..8).map(|_| b.random_index(10)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn commit_musical_frame_derives_duration() {
        let mut fab = fabricator(0);
        // 16 beats at 120 BPM = 8 seconds.
        fab.commit_musical_frame("C minor", 120.0, 0.5, 16.0);
        assert_eq!(fab.segment().duration, 8_000_000);
        assert_eq!(fab.segment().key.as_deref(), Some("C minor"));
    }

    #[test]
    fn choice_ids_are_sequential_within_the_segment() {
        let mut fab = fabricator(0);
        let choice = SegmentChoice {
            id: ChoiceId(0),
            segment_id: SegmentId(0),
            program_type: ProgramType::Macro,
            program_id: None,
            sequence_id: None,
            binding_offset: None,
            instrument_id: None,
            instrument_kind: None,
            picks: Vec::new(),
        };
        let first = fab.add_choice(choice.clone());
        let second = fab.add_choice(choice);
        assert_eq!(first, ChoiceId(1));
        assert_eq!(second, ChoiceId(2));
        assert_eq!(fab.segment().choices[1].segment_id, fab.segment().id);
    }
}
