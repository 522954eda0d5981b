//! Assembles the Leader, Followers, and Heartbeat and drives them on
//! tokio intervals. Ticks themselves stay synchronous so every scheduling
//! behavior is unit-testable without a runtime.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::sync::watch;

use chainwave_ingest::{AccessScope, IngestCache, LibraryStore, SystemTimeSource};
use chainwave_model::{ChainClock, ChainId, EngineConfig, EngineError, SegmentId};

use crate::follower::{Follower, WorkOperation};
use crate::heartbeat::Heartbeat;
use crate::leader::Leader;
use crate::store::{DubService, SegmentStore, ShipService};

/// Cadence of the scheduler loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSchedule {
    /// Interval between Leader/Follower ticks.
    pub tick: Duration,
    /// Interval between heartbeat pulses.
    pub heartbeat: Duration,
}

impl Default for WorkSchedule {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            heartbeat: Duration::from_secs(30),
        }
    }
}

/// Everything one work tick did, aggregated across the Leader and the
/// three Followers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Segments planned by the Leader.
    pub planned: Vec<SegmentId>,
    /// Segments crafted.
    pub crafted: Vec<SegmentId>,
    /// Segments dubbed.
    pub dubbed: Vec<SegmentId>,
    /// Segments shipped.
    pub shipped: Vec<SegmentId>,
    /// Segments retried across all operations.
    pub retried: Vec<SegmentId>,
    /// Segments failed across all operations.
    pub failed: Vec<SegmentId>,
}

/// The assembled fabrication scheduler.
pub struct WorkManager {
    leader: Leader,
    crafter: Follower,
    dubber: Follower,
    shipper: Follower,
    heartbeat: Heartbeat,
    schedule: WorkSchedule,
}

impl WorkManager {
    /// Wires up a manager over the given collaborators.
    ///
    /// Validates the configuration first; an invalid config never produces
    /// a half-built manager.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn SegmentStore>,
        library: Arc<dyn LibraryStore>,
        scope: AccessScope,
        dub: Arc<dyn DubService>,
        ship: Arc<dyn ShipService>,
        clock: Arc<dyn ChainClock>,
        config: EngineConfig,
        schedule: WorkSchedule,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let cache = Arc::new(IngestCache::new(
            library,
            Duration::from_secs(config.cache_ttl_seconds),
            Arc::new(SystemTimeSource),
        ));
        let follower = |operation| {
            Follower::new(
                operation,
                Arc::clone(&store),
                Arc::clone(&cache),
                scope.clone(),
                Arc::clone(&dub),
                Arc::clone(&ship),
                config.clone(),
            )
        };
        Ok(Self {
            leader: Leader::new(Arc::clone(&store), Arc::clone(&clock), config.clone()),
            crafter: follower(WorkOperation::Craft),
            dubber: follower(WorkOperation::Dub),
            shipper: follower(WorkOperation::Ship),
            heartbeat: Heartbeat::new(store, clock, config),
            schedule,
        })
    }

    /// Runs one full scheduling pass: plan, craft, dub, ship.
    ///
    /// Running the operations in pipeline order lets a segment advance
    /// through several states within a single tick.
    pub fn tick(&self) -> Result<TickReport, EngineError> {
        let mut report = TickReport::default();
        report.planned = self.leader.tick()?.planned;
        for (follower, advanced) in [
            (&self.crafter, &mut report.crafted),
            (&self.dubber, &mut report.dubbed),
            (&self.shipper, &mut report.shipped),
        ] {
            let outcome = follower.tick()?;
            advanced.extend(outcome.advanced);
            report.retried.extend(outcome.retried);
            report.failed.extend(outcome.failed);
        }
        Ok(report)
    }

    /// Runs one heartbeat pulse.
    pub fn pulse(&self) -> Result<Vec<ChainId>, EngineError> {
        self.heartbeat.pulse()
    }

    /// Drives the tick and heartbeat loops until `shutdown` flips to true.
    ///
    /// Configuration errors stop the loop; anything else is logged and the
    /// next interval retries.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), EngineError> {
        let mut ticks = tokio::time::interval(self.schedule.tick);
        let mut pulses = tokio::time::interval(self.schedule.heartbeat);
        info!(
            "work loop started (tick {:?}, heartbeat {:?})",
            self.schedule.tick, self.schedule.heartbeat
        );
        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    match self.tick() {
                        Ok(report) if !report.planned.is_empty()
                            || !report.shipped.is_empty()
                            || !report.failed.is_empty() =>
                        {
                            info!(
                                "tick: planned {} crafted {} dubbed {} shipped {} failed {}",
                                report.planned.len(),
                                report.crafted.len(),
                                report.dubbed.len(),
                                report.shipped.len(),
                                report.failed.len()
                            );
                        }
                        Ok(_) => {}
                        Err(err @ EngineError::Config(_)) => {
                            error!("work loop stopping on config error: {err}");
                            return Err(err);
                        }
                        Err(err) => error!("work tick failed: {err}"),
                    }
                }
                _ = pulses.tick() => {
                    if let Err(err) = self.pulse() {
                        error!("heartbeat pulse failed: {err}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("work loop shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }
}
