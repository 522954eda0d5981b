//! Chains and chain bindings.

use serde::{Deserialize, Serialize};

use crate::id::{ChainId, InstrumentId, LibraryId, ProgramId};
use crate::state::ChainState;
use crate::time::ChainMicros;

/// What a chain is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    /// Long-running broadcast output.
    Production,
    /// Short-lived audition output.
    Preview,
}

/// One entity a chain is scoped to draw from.
///
/// Library bindings admit everything the library contains. Program and
/// Instrument bindings pin specific entities; when any program binding of a
/// given program type exists, it overrides the library candidate pool for
/// that craft stage entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum BindingTarget {
    /// All content of one library.
    Library(LibraryId),
    /// One specific program.
    Program(ProgramId),
    /// One specific instrument.
    Instrument(InstrumentId),
}

/// A chain's reference to one bound entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBinding {
    /// The bound entity.
    pub target: BindingTarget,
}

impl ChainBinding {
    /// Binds a whole library.
    pub fn library(id: LibraryId) -> Self {
        Self {
            target: BindingTarget::Library(id),
        }
    }

    /// Binds one program directly.
    pub fn program(id: ProgramId) -> Self {
        Self {
            target: BindingTarget::Program(id),
        }
    }

    /// Binds one instrument directly.
    pub fn instrument(id: InstrumentId) -> Self {
        Self {
            target: BindingTarget::Instrument(id),
        }
    }

    /// Stable sort key used when deriving cache keys: kind tag then raw id.
    pub fn sort_key(&self) -> (u8, u64) {
        match self.target {
            BindingTarget::Library(id) => (0, id.0),
            BindingTarget::Program(id) => (1, id.0),
            BindingTarget::Instrument(id) => (2, id.0),
        }
    }
}

/// A continuously fabricating musical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    /// Unique id.
    pub id: ChainId,
    /// Production or preview.
    pub chain_type: ChainType,
    /// Lifecycle state; mutated only through the state machine.
    pub state: ChainState,
    /// Entities this chain may draw from, in binding order.
    pub bindings: Vec<ChainBinding>,
    /// When playback of this chain begins, in chain micros.
    pub start_at: ChainMicros,
    /// Optional scheduled stop, in chain micros.
    pub stop_at: Option<ChainMicros>,
    /// Last time segment progress was made; drives heartbeat staleness.
    pub updated_at: ChainMicros,
}

impl Chain {
    /// Creates a draft chain.
    pub fn new(id: ChainId, chain_type: ChainType, start_at: ChainMicros) -> Self {
        Self {
            id,
            chain_type,
            state: ChainState::Draft,
            bindings: Vec::new(),
            start_at,
            stop_at: None,
            updated_at: start_at,
        }
    }

    /// Adds a binding, returning self for chained construction.
    pub fn with_binding(mut self, binding: ChainBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// All program ids bound directly to this chain.
    pub fn bound_program_ids(&self) -> Vec<ProgramId> {
        self.bindings
            .iter()
            .filter_map(|b| match b.target {
                BindingTarget::Program(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// All instrument ids bound directly to this chain.
    pub fn bound_instrument_ids(&self) -> Vec<InstrumentId> {
        self.bindings
            .iter()
            .filter_map(|b| match b.target {
                BindingTarget::Instrument(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_sort_by_kind_then_id() {
        let mut bindings = vec![
            ChainBinding::instrument(InstrumentId(1)),
            ChainBinding::program(ProgramId(9)),
            ChainBinding::library(LibraryId(4)),
            ChainBinding::program(ProgramId(2)),
        ];
        bindings.sort_by_key(ChainBinding::sort_key);
        assert_eq!(
            bindings,
            vec![
                ChainBinding::library(LibraryId(4)),
                ChainBinding::program(ProgramId(2)),
                ChainBinding::program(ProgramId(9)),
                ChainBinding::instrument(InstrumentId(1)),
            ]
        );
    }

    #[test]
    fn direct_bindings_are_extractable_by_kind() {
        let chain = Chain::new(ChainId(1), ChainType::Production, 0)
            .with_binding(ChainBinding::library(LibraryId(1)))
            .with_binding(ChainBinding::program(ProgramId(5)))
            .with_binding(ChainBinding::instrument(InstrumentId(3)));
        assert_eq!(chain.bound_program_ids(), vec![ProgramId(5)]);
        assert_eq!(chain.bound_instrument_ids(), vec![InstrumentId(3)]);
    }
}
