//! Chainwave Craft Pipeline
//!
//! Makes the musical choices for one segment. A [`Fabricator`] is built per
//! segment entering `Crafting`; the ordered [`CraftStage`] pipeline then
//! runs over it, each stage reading the prior segment and the Ingest and
//! writing choices onto the working segment:
//!
//! 1. **MacroMain** — macro-program arc position and the main program
//!    supplying key, tempo, density, memes, and chords.
//! 2. **Beat** — rhythm program + drum instrument, with a penalty for
//!    repeating the previous segment's choice.
//! 3. **Detail** — melodic/detail material.
//! 4. **Transition**, **Background** — supporting layers.
//!
//! Fabrication is reproducible: the only randomness is a `Pcg32` seeded
//! from the chain id and segment offset, so the same Ingest and prior
//! segment always yield the same choices.

pub mod arrangement;
pub mod error;
pub mod fabricator;
pub mod macro_main;
pub mod selection;
pub mod stage;

pub use error::CraftError;
pub use fabricator::Fabricator;
pub use stage::{craft_segment, CraftStage};
