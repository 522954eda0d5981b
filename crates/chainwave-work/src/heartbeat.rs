//! Heartbeat: revives fabricating chains that stopped making progress.

use std::sync::Arc;

use log::warn;

use chainwave_model::{
    micros_from_seconds, ChainClock, ChainId, ChainState, EngineConfig, EngineError, SegmentState,
};

use crate::store::{ClaimOutcome, SegmentStore};

/// Scans `Fabricate` chains for staleness and revives them.
///
/// A chain whose `updated_at` has not moved for `chain_stale_seconds` is
/// assumed to have lost its worker. Revival releases any claim the dead
/// worker left behind, then bumps the timestamp to put the chain back in
/// rotation.
pub struct Heartbeat {
    store: Arc<dyn SegmentStore>,
    clock: Arc<dyn ChainClock>,
    config: EngineConfig,
}

impl Heartbeat {
    /// Creates a heartbeat over a store and clock.
    pub fn new(
        store: Arc<dyn SegmentStore>,
        clock: Arc<dyn ChainClock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Runs one staleness scan, returning the chains revived.
    pub fn pulse(&self) -> Result<Vec<ChainId>, EngineError> {
        let now = self.clock.now_micros();
        let stale_before = now - micros_from_seconds(self.config.chain_stale_seconds);
        let mut revived = Vec::new();
        for mut chain in self.store.chains_in_state(ChainState::Fabricate)? {
            if chain.updated_at >= stale_before {
                continue;
            }
            self.release_abandoned_claims(chain.id)?;
            let idle_since = chain.updated_at;
            chain.updated_at = now;
            self.store.save_chain(&chain)?;
            warn!("revived stale chain {} (idle since {idle_since})", chain.id);
            revived.push(chain.id);
        }
        Ok(revived)
    }

    /// Releases claims left behind on one chain's segments.
    ///
    /// A worker that dies after the claim compare-and-swap leaves its
    /// segment persisted as `Claimed`, a state no Follower queries.
    /// Swapping it back to the recorded source state puts the work where a
    /// healthy Follower will find it; the swap is itself a CAS, so a worker
    /// that turns out to be alive loses nothing but the claim.
    fn release_abandoned_claims(&self, chain_id: ChainId) -> Result<(), EngineError> {
        let stuck = self
            .store
            .segments_in_state(SegmentState::Claimed, usize::MAX)?;
        for segment in stuck.into_iter().filter(|s| s.chain_id == chain_id) {
            let Some(source) = segment.claimed_from else {
                continue;
            };
            let outcome = self
                .store
                .claim_segment(segment.id, SegmentState::Claimed, source)?;
            if matches!(outcome, ClaimOutcome::Claimed(_)) {
                warn!(
                    "released abandoned claim on segment {} back to {source:?}",
                    segment.id
                );
            }
        }
        Ok(())
    }
}
