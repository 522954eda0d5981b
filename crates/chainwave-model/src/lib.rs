//! Chainwave Data Model
//!
//! Plain data structs for every entity the fabrication engine works over —
//! chains, segments, choices, and the library source material — together
//! with the chain/segment state machine, the engine error taxonomy, the
//! configuration surface, and free validation functions.
//!
//! Entities here are deliberately flat: one struct per entity type with
//! serde derives, no inheritance hierarchy, no wrapper types. Behavior that
//! crosses entities (state transitions, validation) lives in free functions
//! and enum methods so it can be tested without any runtime wiring.

pub mod chain;
pub mod config;
pub mod content;
pub mod error;
pub mod id;
pub mod segment;
pub mod state;
pub mod time;
pub mod validation;

pub use chain::{Chain, ChainBinding, ChainType, BindingTarget};
pub use config::EngineConfig;
pub use content::{
    Instrument, InstrumentAudio, InstrumentKind, Library, LibraryContent, Program, ProgramSequence,
    ProgramType, SequenceBinding, SequenceChord, SequenceEvent,
};
pub use error::{ConfigError, EngineError, ValidationError};
pub use id::{
    AudioId, ChainId, ChoiceId, InstrumentId, LibraryId, ProgramId, SegmentId, SequenceId,
};
pub use segment::{
    round_position, Segment, SegmentChoice, SegmentChord, SegmentPick, POSITION_DECIMALS,
};
pub use state::{ChainState, SegmentState};
pub use time::{
    micros_from_seconds, seconds_from_micros, ChainClock, ChainMicros, SystemChainClock,
    MICROS_PER_SECOND,
};
pub use validation::{validate_chain, validate_instrument, validate_program, validate_segment};
