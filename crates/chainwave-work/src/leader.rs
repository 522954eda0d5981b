//! Leader: plans segments ahead of playback.
//!
//! The Leader is the only creator of segments, which is what keeps offsets
//! contiguous and strictly increasing per chain. Everything downstream of
//! `Planned` belongs to the Followers.

use std::sync::Arc;

use log::{debug, info};

use chainwave_model::{
    micros_from_seconds, ChainClock, ChainState, EngineConfig, EngineError, Segment, SegmentId,
};

use crate::store::SegmentStore;

/// What one Leader tick did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LeaderReport {
    /// Segments planned this tick.
    pub planned: Vec<SegmentId>,
}

/// Plans one segment per fabricating chain whenever the crafted horizon
/// falls inside the craft-ahead buffer.
pub struct Leader {
    store: Arc<dyn SegmentStore>,
    clock: Arc<dyn ChainClock>,
    config: EngineConfig,
}

impl Leader {
    /// Creates a leader over a store and clock.
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

    /// Runs one planning pass over the fabricating chains.
    ///
    /// At most `follower_batch_size` chains are considered per tick; a
    /// long chain list spreads across ticks rather than starving one tick.
    pub fn tick(&self) -> Result<LeaderReport, EngineError> {
        let mut report = LeaderReport::default();
        let chains = self.store.chains_in_state(ChainState::Fabricate)?;
        for mut chain in chains.into_iter().take(self.config.follower_batch_size) {
            let now = self.clock.now_micros();
            if chain.stop_at.map(|stop| now >= stop).unwrap_or(false) {
                debug!("chain {} past stop_at, not planning", chain.id);
                continue;
            }

            let latest = self.store.latest_segment(chain.id)?;
            let plan = match &latest {
                None => Some((0, chain.start_at)),
                // A tail segment with no committed duration has no end time
                // yet; planning past it would stack segments at the same
                // begin_at.
                Some(latest) if latest.duration == 0 => {
                    debug!(
                        "chain {} waiting on segment {} to craft before planning",
                        chain.id, latest.id
                    );
                    None
                }
                Some(latest) => {
                    let horizon = now + micros_from_seconds(self.config.buffer_ahead_seconds);
                    (latest.end_at() < horizon).then(|| (latest.offset + 1, latest.end_at()))
                }
            };
            let Some((offset, begin_at)) = plan else {
                continue;
            };

            let created = self.store.create_segment(Segment::planned(
                SegmentId(0),
                chain.id,
                offset,
                begin_at,
            ))?;
            chain.updated_at = now;
            self.store.save_chain(&chain)?;
            info!(
                "planned segment {} chain {} offset {offset} begin_at {begin_at}",
                created.id, chain.id
            );
            report.planned.push(created.id);
        }
        Ok(report)
    }
}
