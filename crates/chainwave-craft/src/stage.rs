//! The fixed-order craft stage pipeline.
//!
//! Stage order is data, not wiring: [`CraftStage::pipeline`] returns the
//! stages in execution order and [`craft_segment`] runs them, aborting at
//! the first failure with the stage name recorded on the error.

use chainwave_model::{validate_segment, EngineError, InstrumentKind, ProgramType, SegmentState};

use crate::arrangement::{self, LaneSpec};
use crate::error::CraftError;
use crate::fabricator::Fabricator;
use crate::macro_main;

/// One stage of the craft pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CraftStage {
    /// Macro arc position + main program; commits the musical frame.
    MacroMain,
    /// Rhythm lane.
    Beat,
    /// Melodic/detail lane.
    Detail,
    /// Transition effects lane.
    Transition,
    /// Ambience lane.
    Background,
}

impl CraftStage {
    /// The stages in their fixed execution order.
    pub fn pipeline() -> [CraftStage; 5] {
        [
            CraftStage::MacroMain,
            CraftStage::Beat,
            CraftStage::Detail,
            CraftStage::Transition,
            CraftStage::Background,
        ]
    }

    /// Stage name for logs and error context.
    pub fn name(self) -> &'static str {
        match self {
            CraftStage::MacroMain => "macro_main",
            CraftStage::Beat => "beat",
            CraftStage::Detail => "detail",
            CraftStage::Transition => "transition",
            CraftStage::Background => "background",
        }
    }

    fn run(self, fab: &mut Fabricator) -> Result<(), EngineError> {
        match self {
            CraftStage::MacroMain => macro_main::run(fab),
            CraftStage::Beat => arrangement::run(
                fab,
                LaneSpec {
                    program_type: ProgramType::Beat,
                    instrument_kind: InstrumentKind::Drum,
                    avoid_prior_repeat: true,
                },
            ),
            CraftStage::Detail => arrangement::run(
                fab,
                LaneSpec {
                    program_type: ProgramType::Detail,
                    instrument_kind: InstrumentKind::Bass,
                    avoid_prior_repeat: false,
                },
            ),
            CraftStage::Transition => arrangement::run(
                fab,
                LaneSpec {
                    program_type: ProgramType::Transition,
                    instrument_kind: InstrumentKind::Noise,
                    avoid_prior_repeat: false,
                },
            ),
            CraftStage::Background => arrangement::run(
                fab,
                LaneSpec {
                    program_type: ProgramType::Background,
                    instrument_kind: InstrumentKind::Pad,
                    avoid_prior_repeat: false,
                },
            ),
        }
    }
}

/// Runs the full pipeline over a fabricator, then validates the crafted
/// segment. The first stage failure aborts the remaining stages.
pub fn craft_segment(fab: &mut Fabricator) -> Result<(), CraftError> {
    let segment_id = fab.segment().id;
    for stage in CraftStage::pipeline() {
        stage.run(fab).map_err(|source| CraftError {
            segment_id,
            stage: stage.name(),
            source,
        })?;
    }
    // Validate as the state the segment is about to enter, so a pipeline
    // that failed to commit the musical frame is caught here and not at
    // the store.
    let mut crafted = fab.segment().clone();
    crafted.state = SegmentState::Crafted;
    validate_segment(&crafted).map_err(|err| CraftError {
        segment_id,
        stage: "validate",
        source: EngineError::from(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_order_is_fixed() {
        let stages = CraftStage::pipeline();
        assert_eq!(stages[0], CraftStage::MacroMain);
        assert_eq!(stages[1], CraftStage::Beat);
        assert_eq!(stages[4], CraftStage::Background);
        assert_eq!(stages.len(), 5);
    }

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(CraftStage::MacroMain.name(), "macro_main");
        assert_eq!(CraftStage::Background.name(), "background");
    }
}
