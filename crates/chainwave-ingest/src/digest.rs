//! Derived, typed summaries over one Ingest.
//!
//! Each digest is computed in one pass over the Ingest's content and then
//! owned by the Ingest for its lifetime. None of them hold references back
//! into the content, so they are cheap to hand out.

use std::collections::BTreeMap;

use chainwave_isometry::{stem, Isometry};
use chainwave_model::LibraryContent;

/// Histogram of meme usage across all programs and instruments in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemeDigest {
    /// Stemmed meme form -> number of entities carrying it.
    pub counts: BTreeMap<String, usize>,
    /// Canonical signature of the full meme vocabulary.
    pub constellation: String,
}

impl MemeDigest {
    /// Tallies meme usage over the content.
    pub fn compute(content: &LibraryContent) -> Self {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut all = Isometry::of_memes(Vec::<String>::new());
        let meme_sets = content
            .programs
            .iter()
            .map(|p| &p.memes)
            .chain(content.instruments.iter().map(|i| &i.memes));
        for memes in meme_sets {
            for meme in memes {
                *counts.entry(stem(meme)).or_insert(0) += 1;
                all.add(meme);
            }
        }
        Self {
            counts,
            constellation: all.constellation(),
        }
    }

    /// How many entities carry a meme (by stemmed form).
    pub fn count(&self, meme: &str) -> usize {
        self.counts.get(&stem(meme)).copied().unwrap_or(0)
    }
}

/// Distinct chord progressions found in program sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordProgressionDigest {
    /// Progression signature (chord names in order, joined by `|`) ->
    /// number of sequences exhibiting it.
    pub progressions: BTreeMap<String, usize>,
}

impl ChordProgressionDigest {
    /// Collects progression signatures over all sequences with chords.
    pub fn compute(content: &LibraryContent) -> Self {
        let mut progressions: BTreeMap<String, usize> = BTreeMap::new();
        for program in &content.programs {
            for sequence in &program.sequences {
                if sequence.chords.is_empty() {
                    continue;
                }
                let mut ordered = sequence.chords.clone();
                ordered.sort_by(|a, b| a.position.total_cmp(&b.position));
                let signature = ordered
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join("|");
                *progressions.entry(signature).or_insert(0) += 1;
            }
        }
        Self { progressions }
    }
}

/// Forward chord-transition counts over all sequences in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordMarkovDigest {
    /// from-chord -> (to-chord -> observed transitions).
    pub transitions: BTreeMap<String, BTreeMap<String, usize>>,
}

impl ChordMarkovDigest {
    /// Counts adjacent chord pairs in position order.
    pub fn compute(content: &LibraryContent) -> Self {
        let mut transitions: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for program in &content.programs {
            for sequence in &program.sequences {
                let mut ordered = sequence.chords.clone();
                ordered.sort_by(|a, b| a.position.total_cmp(&b.position));
                for pair in ordered.windows(2) {
                    *transitions
                        .entry(pair[0].name.clone())
                        .or_default()
                        .entry(pair[1].name.clone())
                        .or_insert(0) += 1;
                }
            }
        }
        Self { transitions }
    }

    /// Observed transitions from one chord to another.
    pub fn count(&self, from: &str, to: &str) -> usize {
        self.transitions
            .get(from)
            .and_then(|tos| tos.get(to))
            .copied()
            .unwrap_or(0)
    }
}

/// Tempo/density distribution over all sequences in scope.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStyleDigest {
    /// Number of sequences observed.
    pub sequence_count: usize,
    /// Mean beats per minute.
    pub mean_tempo: f64,
    /// Mean density.
    pub mean_density: f64,
    /// Slowest observed tempo.
    pub min_tempo: f64,
    /// Fastest observed tempo.
    pub max_tempo: f64,
}

impl SequenceStyleDigest {
    /// Aggregates tempo and density over all sequences.
    pub fn compute(content: &LibraryContent) -> Self {
        let mut count = 0usize;
        let mut tempo_sum = 0.0;
        let mut density_sum = 0.0;
        let mut min_tempo = f64::INFINITY;
        let mut max_tempo = f64::NEG_INFINITY;
        for program in &content.programs {
            for sequence in &program.sequences {
                count += 1;
                tempo_sum += sequence.tempo;
                density_sum += sequence.density;
                min_tempo = min_tempo.min(sequence.tempo);
                max_tempo = max_tempo.max(sequence.tempo);
            }
        }
        if count == 0 {
            return Self {
                sequence_count: 0,
                mean_tempo: 0.0,
                mean_density: 0.0,
                min_tempo: 0.0,
                max_tempo: 0.0,
            };
        }
        Self {
            sequence_count: count,
            mean_tempo: tempo_sum / count as f64,
            mean_density: density_sum / count as f64,
            min_tempo,
            max_tempo,
        }
    }
}
