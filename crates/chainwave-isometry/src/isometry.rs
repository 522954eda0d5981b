//! Isometry scoring between a source label set and candidate label sets.

use std::collections::BTreeSet;

use crate::phonetic::phonetic;
use crate::stem::stem;

/// Score added for every candidate label matching a source label.
pub const DEFAULT_MATCH_SCORE: f64 = 0.25;

/// Separator joining normalized forms into a constellation signature.
pub const CONSTELLATION_SEPARATOR: &str = ",";

/// Prefix marking a label as a negation ("anti-meme"), e.g. `!Clumsy`.
pub const NEGATION_MARKER: char = '!';

/// Which normalization the matcher applies to labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Linguistic stemming, for meme labels.
    Stem,
    /// Consonant-cluster phonetic codes, for voice/event names.
    Phonetic,
}

/// A source label set in normalized form, scoring candidates against it.
///
/// Construction normalizes and deduplicates the source labels; the
/// `BTreeSet` keeps them sorted so [`Isometry::constellation`] is canonical
/// regardless of input order.
#[derive(Debug, Clone)]
pub struct Isometry {
    mode: MatchMode,
    sources: BTreeSet<String>,
}

impl Isometry {
    /// Creates an empty matcher in the given mode.
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            sources: BTreeSet::new(),
        }
    }

    /// Creates a stem-mode matcher from meme labels.
    pub fn of_memes<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut iso = Self::new(MatchMode::Stem);
        for label in labels {
            iso.add(label.as_ref());
        }
        iso
    }

    /// Creates a phonetic-mode matcher from voice/event names.
    pub fn of_events<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut iso = Self::new(MatchMode::Phonetic);
        for label in labels {
            iso.add(label.as_ref());
        }
        iso
    }

    /// Adds one source label.
    pub fn add(&mut self, label: &str) {
        let normalized = self.normalize(label);
        if !normalized.is_empty() {
            self.sources.insert(normalized);
        }
    }

    /// Number of distinct normalized source labels.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True when no source labels are present.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Normalizes a label, retaining a leading negation marker as part of
    /// the normalized form so `!Clumsy` stays distinct from `Clumsy`.
    fn normalize(&self, label: &str) -> String {
        let trimmed = label.trim();
        let (negated, body) = match trimmed.strip_prefix(NEGATION_MARKER) {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let normalized = match self.mode {
            MatchMode::Stem => stem(body),
            MatchMode::Phonetic => phonetic(body),
        };
        if normalized.is_empty() {
            return normalized;
        }
        if negated {
            format!("{NEGATION_MARKER}{normalized}")
        } else {
            normalized
        }
    }

    /// Scores a candidate label set: each candidate whose normalized form
    /// exactly matches a source label adds `per_match`.
    pub fn score<I, S>(&self, candidates: I, per_match: f64) -> f64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut total = 0.0;
        for candidate in candidates {
            let normalized = self.normalize(candidate.as_ref());
            if !normalized.is_empty() && self.sources.contains(&normalized) {
                total += per_match;
            }
        }
        total
    }

    /// Scores a comma-separated candidate list.
    pub fn score_csv(&self, csv: &str, per_match: f64) -> f64 {
        self.score(csv.split(',').map(str::trim), per_match)
    }

    /// True unless some candidate label's normalized form appears negated
    /// in the source set (a source `!x` forbids candidates bearing `x`).
    pub fn is_allowed<I, S>(&self, candidates: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for candidate in candidates {
            let normalized = self.normalize(candidate.as_ref());
            if normalized.is_empty() || normalized.starts_with(NEGATION_MARKER) {
                continue;
            }
            if self.sources.contains(&format!("{NEGATION_MARKER}{normalized}")) {
                return false;
            }
        }
        true
    }

    /// The canonical signature of the source set: normalized forms,
    /// deduplicated, sorted, joined with [`CONSTELLATION_SEPARATOR`].
    pub fn constellation(&self) -> String {
        self.sources
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(CONSTELLATION_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_stemmed_matches() {
        let iso = Isometry::of_memes(["Intensity", "Cool", "Dark"]);
        assert_eq!(iso.score_csv("jam,bun", DEFAULT_MATCH_SCORE), 0.0);
        assert_eq!(iso.score_csv("jam,bun,intense", DEFAULT_MATCH_SCORE), 0.25);
        assert_eq!(
            iso.score_csv("coolness,intense,darkness", DEFAULT_MATCH_SCORE),
            0.75
        );
    }

    #[test]
    fn scores_phonetic_matches() {
        let iso = Isometry::of_events(["Kick", "Snare"]);
        assert_eq!(iso.score(["Kik"], 1.0), 1.0);
        assert_eq!(iso.score(["Snr", "Kick"], 1.0), 2.0);
        assert_eq!(iso.score(["Tom"], 1.0), 0.0);
    }

    #[test]
    fn negated_labels_stay_distinct() {
        let iso = Isometry::of_memes(["!Clumsy", "Smooth"]);
        assert_eq!(iso.constellation(), "!clumsy,smooth");
        assert!(iso.is_allowed(["Smooth", "Fast"]));
        assert!(!iso.is_allowed(["Clumsy"]));
        // A negated candidate matches the negated source entry.
        assert_eq!(iso.score(["!Clumsy"], DEFAULT_MATCH_SCORE), 0.25);
    }

    #[test]
    fn empty_source_scores_nothing_and_allows_everything() {
        let iso = Isometry::of_memes(Vec::<String>::new());
        assert!(iso.is_empty());
        assert_eq!(iso.score_csv("anything", DEFAULT_MATCH_SCORE), 0.0);
        assert!(iso.is_allowed(["anything"]));
    }
}
