//! Chain and segment lifecycle state machines.
//!
//! Transition legality is a pure function of (from, to); callers that
//! persist state changes must check it first. Segment states are strictly
//! ordered with no skipping, so a segment can never jump from `Planned` to
//! `Crafted` without passing through `Crafting`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lifecycle state of a [`crate::Chain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    /// Being assembled; not yet schedulable.
    Draft,
    /// Steady state: segments are continuously produced.
    Fabricate,
    /// Suspended; may resume to `Fabricate`.
    Pause,
    /// Unrecoverable error; may be closed out to `Complete`.
    Fail,
    /// Terminal.
    Complete,
}

impl ChainState {
    /// Whether moving from `self` to `to` is a legal chain transition.
    pub fn can_transition(self, to: ChainState) -> bool {
        use ChainState::*;
        matches!(
            (self, to),
            (Draft, Fabricate)
                | (Fabricate, Pause)
                | (Fabricate, Fail)
                | (Pause, Fabricate)
                | (Pause, Complete)
                | (Fail, Complete)
        )
    }

    /// Validates a transition, naming the offending field on rejection.
    pub fn require_transition(self, to: ChainState) -> Result<(), ValidationError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "chain.state",
                format!("illegal chain transition {self:?} -> {to:?}"),
            ))
        }
    }
}

/// Lifecycle state of a [`crate::Segment`].
///
/// `Claimed` is the intermediate marker a Follower swaps in while it holds
/// exclusive ownership of the segment; it always resolves back to a named
/// state before the claim is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentState {
    /// Created by the Leader; awaiting craft.
    Planned,
    /// Claim marker held by exactly one worker.
    Claimed,
    /// Craft stages running.
    Crafting,
    /// All craft stages complete.
    Crafted,
    /// Dub collaborator rendering audio.
    Dubbing,
    /// Rendered; awaiting ship.
    Dubbed,
    /// Published. Terminal.
    Shipped,
    /// Terminal error state; retained for diagnosis.
    Failed,
}

impl SegmentState {
    /// The next state in the strictly ordered pipeline, if any.
    pub fn next(self) -> Option<SegmentState> {
        use SegmentState::*;
        match self {
            Planned => Some(Crafting),
            Crafting => Some(Crafted),
            Crafted => Some(Dubbing),
            Dubbing => Some(Dubbed),
            Dubbed => Some(Shipped),
            Claimed | Shipped | Failed => None,
        }
    }

    /// True for `Shipped` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, SegmentState::Shipped | SegmentState::Failed)
    }

    /// Whether moving from `self` to `to` is a legal segment transition.
    ///
    /// Legal moves are: one step forward in the pipeline, in or out of the
    /// `Claimed` marker, or to `Failed` from any non-terminal state.
    pub fn can_transition(self, to: SegmentState) -> bool {
        use SegmentState::*;
        if self == to {
            return false;
        }
        match (self, to) {
            (from, Failed) => !from.is_terminal(),
            (from, Claimed) => !from.is_terminal(),
            // Releasing a claim may land on any named state: forward on
            // success, back to the source state on a retryable error.
            (Claimed, _) => true,
            (from, _) => from.next() == Some(to),
        }
    }

    /// Validates a transition, naming the offending field on rejection.
    pub fn require_transition(self, to: SegmentState) -> Result<(), ValidationError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "segment.state",
                format!("illegal segment transition {self:?} -> {to:?}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_follows_draft_fabricate_pause_complete() {
        assert!(ChainState::Draft.can_transition(ChainState::Fabricate));
        assert!(ChainState::Fabricate.can_transition(ChainState::Pause));
        assert!(ChainState::Pause.can_transition(ChainState::Fabricate));
        assert!(ChainState::Pause.can_transition(ChainState::Complete));
        assert!(ChainState::Fail.can_transition(ChainState::Complete));
    }

    #[test]
    fn chain_rejects_skips_and_reversals() {
        assert!(!ChainState::Draft.can_transition(ChainState::Complete));
        assert!(!ChainState::Complete.can_transition(ChainState::Fabricate));
        assert!(!ChainState::Fabricate.can_transition(ChainState::Draft));
        assert!(ChainState::Draft
            .require_transition(ChainState::Complete)
            .is_err());
    }

    #[test]
    fn segment_pipeline_is_strictly_ordered() {
        use SegmentState::*;
        assert!(Planned.can_transition(Crafting));
        assert!(Crafting.can_transition(Crafted));
        assert!(Crafted.can_transition(Dubbing));
        assert!(Dubbing.can_transition(Dubbed));
        assert!(Dubbed.can_transition(Shipped));
    }

    #[test]
    fn segment_rejects_planned_to_crafted_skip() {
        let err = SegmentState::Planned
            .require_transition(SegmentState::Crafted)
            .unwrap_err();
        assert_eq!(err.field, "segment.state");
    }

    #[test]
    fn segment_fails_from_any_nonterminal_state() {
        use SegmentState::*;
        for from in [Planned, Claimed, Crafting, Crafted, Dubbing, Dubbed] {
            assert!(from.can_transition(Failed), "{from:?} should fail cleanly");
        }
        assert!(!Shipped.can_transition(Failed));
        assert!(!Failed.can_transition(Planned));
    }

    #[test]
    fn claim_marker_brackets_working_states() {
        use SegmentState::*;
        assert!(Planned.can_transition(Claimed));
        assert!(Claimed.can_transition(Crafting));
        assert!(Claimed.can_transition(Planned), "claim release for retry");
        assert!(Crafted.can_transition(Claimed));
        assert!(Claimed.can_transition(Dubbing));
        assert!(Dubbed.can_transition(Claimed));
        assert!(Claimed.can_transition(Shipped));
        assert!(!Shipped.can_transition(Claimed));
    }
}
