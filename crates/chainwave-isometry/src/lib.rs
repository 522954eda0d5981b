//! Chainwave Isometry Matcher
//!
//! This crate scores the similarity between a source set of labels (memes,
//! chord names, instrument-voice names) and candidate label sets, and
//! produces canonical signatures ("constellations") for label sets.
//!
//! # Overview
//!
//! Every label is reduced to a normalized form before comparison:
//!
//! - **Stem** mode reduces inflected word forms to a common root
//!   (`"Intensity"` → `"intens"`, `"coolness"` → `"cool"`), used for memes.
//! - **Phonetic** mode reduces a name to a consonant-cluster code
//!   (`"Kick"` → `"KK"`, `"Snare"` → `"SNR"`), used for voice and audio
//!   event names.
//!
//! Scoring is additive: every candidate label whose normalized form exactly
//! matches a source label's normalized form adds a fixed per-match score.
//!
//! # Example
//!
//! ```
//! use chainwave_isometry::{Isometry, DEFAULT_MATCH_SCORE};
//!
//! let iso = Isometry::of_memes(["Intensity", "Cool", "Dark"]);
//! assert_eq!(iso.score_csv("jam,bun", DEFAULT_MATCH_SCORE), 0.0);
//! assert_eq!(iso.score_csv("coolness,intense,darkness", DEFAULT_MATCH_SCORE), 0.75);
//! assert_eq!(iso.constellation(), "cool,dark,intens");
//! ```

pub mod isometry;
pub mod phonetic;
pub mod stem;

pub use isometry::{Isometry, MatchMode, CONSTELLATION_SEPARATOR, DEFAULT_MATCH_SCORE, NEGATION_MARKER};
pub use phonetic::phonetic;
pub use stem::stem;
