//! Follower: advances claimed segments through one lifecycle operation.
//!
//! Each Follower is bound to one operation (craft, dub, or ship) and pulls
//! a bounded batch of segments from that operation's source state per tick.
//! Exclusivity between concurrent workers comes entirely from the store's
//! claim compare-and-swap; while a worker holds the claim the persisted
//! state is `Claimed`, and the claim is always released onto a named state:
//! forward on success, back to the source state for a retry, or `Failed`.

use std::sync::Arc;

use log::{debug, info, warn};

use chainwave_craft::{craft_segment, CraftError, Fabricator};
use chainwave_ingest::{AccessScope, IngestCache};
use chainwave_model::{
    Chain, EngineConfig, EngineError, Segment, SegmentId, SegmentState, ValidationError,
};

use crate::store::{ClaimOutcome, DubService, SegmentStore, ShipService};

/// One segment lifecycle operation a Follower can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOperation {
    /// `Planned` → craft pipeline → `Crafted`.
    Craft,
    /// `Crafted` → dub collaborator → `Dubbed`.
    Dub,
    /// `Dubbed` → ship collaborator → `Shipped`.
    Ship,
}

impl WorkOperation {
    /// The state this operation pulls segments from.
    pub fn source_state(self) -> SegmentState {
        match self {
            WorkOperation::Craft => SegmentState::Planned,
            WorkOperation::Dub => SegmentState::Crafted,
            WorkOperation::Ship => SegmentState::Dubbed,
        }
    }

    /// The in-progress state held while the operation runs.
    ///
    /// Ship has no rendering phase, so its working state is the claim
    /// marker itself.
    pub fn working_state(self) -> SegmentState {
        match self {
            WorkOperation::Craft => SegmentState::Crafting,
            WorkOperation::Dub => SegmentState::Dubbing,
            WorkOperation::Ship => SegmentState::Claimed,
        }
    }

    /// The state a successful run lands the segment in.
    pub fn success_state(self) -> SegmentState {
        match self {
            WorkOperation::Craft => SegmentState::Crafted,
            WorkOperation::Dub => SegmentState::Dubbed,
            WorkOperation::Ship => SegmentState::Shipped,
        }
    }

    /// Operation name for logs.
    pub fn name(self) -> &'static str {
        match self {
            WorkOperation::Craft => "craft",
            WorkOperation::Dub => "dub",
            WorkOperation::Ship => "ship",
        }
    }
}

/// What one Follower tick did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FollowerReport {
    /// Segments advanced to the operation's success state.
    pub advanced: Vec<SegmentId>,
    /// Segments put back for another attempt after a transient failure.
    pub retried: Vec<SegmentId>,
    /// Segments marked `Failed`.
    pub failed: Vec<SegmentId>,
    /// Claims lost to a concurrent worker.
    pub contested: usize,
}

/// Pulls segments in one source state and runs one operation over each.
pub struct Follower {
    operation: WorkOperation,
    store: Arc<dyn SegmentStore>,
    cache: Arc<IngestCache>,
    scope: AccessScope,
    dub: Arc<dyn DubService>,
    ship: Arc<dyn ShipService>,
    config: EngineConfig,
}

impl Follower {
    /// Creates a follower bound to one operation.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operation: WorkOperation,
        store: Arc<dyn SegmentStore>,
        cache: Arc<IngestCache>,
        scope: AccessScope,
        dub: Arc<dyn DubService>,
        ship: Arc<dyn ShipService>,
        config: EngineConfig,
    ) -> Self {
        Self {
            operation,
            store,
            cache,
            scope,
            dub,
            ship,
            config,
        }
    }

    /// Runs one batch of this Follower's operation.
    ///
    /// Per-segment failures are absorbed into the report; only a
    /// configuration error (or a store failure on the batch query itself)
    /// aborts the tick.
    pub fn tick(&self) -> Result<FollowerReport, EngineError> {
        let mut report = FollowerReport::default();
        let source = self.operation.source_state();
        let batch = self
            .store
            .segments_in_state(source, self.config.follower_batch_size)?;

        for candidate in batch {
            match self
                .store
                .claim_segment(candidate.id, source, SegmentState::Claimed)?
            {
                ClaimOutcome::Claimed(segment) => {
                    self.run_claimed(segment, &mut report)?;
                }
                ClaimOutcome::AlreadyTaken => {
                    debug!(
                        "segment {} contested during {}",
                        candidate.id,
                        self.operation.name()
                    );
                    report.contested += 1;
                }
                ClaimOutcome::NotFound => {}
            }
        }
        Ok(report)
    }

    /// Runs the operation over one claimed segment and releases the claim.
    ///
    /// Returns `Err` only for configuration errors, which poison the whole
    /// tick; every other failure resolves the segment itself.
    fn run_claimed(
        &self,
        mut segment: Segment,
        report: &mut FollowerReport,
    ) -> Result<(), EngineError> {
        let id = segment.id;
        segment.state = self.operation.working_state();
        let outcome = self.run_operation(&mut segment);

        match outcome {
            Ok(()) => {
                segment.state = self.operation.success_state();
                self.store.save_segment(&segment)?;
                info!(
                    "segment {id} {} complete, now {:?}",
                    self.operation.name(),
                    segment.state
                );
                report.advanced.push(id);
            }
            Err(EngineError::Config(err)) => {
                // Put the segment back before surfacing the fatal error.
                segment.state = self.operation.source_state();
                self.store.save_segment(&segment)?;
                return Err(EngineError::Config(err));
            }
            Err(err) if err.is_retryable() => {
                segment.retry_count += 1;
                if segment.retry_count > self.config.segment_retry_limit {
                    self.fail(&mut segment, &err)?;
                    report.failed.push(id);
                } else {
                    warn!(
                        "segment {id} {} attempt {} failed, retrying: {err}",
                        self.operation.name(),
                        segment.retry_count
                    );
                    segment.state = self.operation.source_state();
                    self.store.save_segment(&segment)?;
                    report.retried.push(id);
                }
            }
            Err(err) => {
                self.fail(&mut segment, &err)?;
                report.failed.push(id);
            }
        }
        Ok(())
    }

    fn fail(&self, segment: &mut Segment, err: &EngineError) -> Result<(), EngineError> {
        warn!(
            "segment {} failed during {}: {err}",
            segment.id,
            self.operation.name()
        );
        segment.state = SegmentState::Failed;
        segment.error_message = Some(err.to_string());
        self.store.save_segment(segment)?;
        Ok(())
    }

    fn run_operation(&self, segment: &mut Segment) -> Result<(), EngineError> {
        let chain = self
            .store
            .load_chain(segment.chain_id)?
            .ok_or_else(|| {
                EngineError::from(ValidationError::new(
                    "segment.chain_id",
                    format!("chain {} does not exist", segment.chain_id),
                ))
            })?;

        match self.operation {
            WorkOperation::Craft => self.craft(&chain, segment),
            WorkOperation::Dub => {
                let waveform_key = self.dub.dub(&chain, segment)?;
                segment.waveform_key = Some(waveform_key);
                Ok(())
            }
            WorkOperation::Ship => self.ship.ship(&chain, segment),
        }
    }

    /// Builds a fabricator over the chain's current Ingest and the prior
    /// segment, runs the craft pipeline, and replaces the segment with the
    /// crafted result.
    fn craft(&self, chain: &Chain, segment: &mut Segment) -> Result<(), EngineError> {
        let ingest = self.cache.ingest(&self.scope, &chain.bindings)?;
        let prior = match segment.offset.checked_sub(1) {
            Some(prior_offset) => self.store.segment_at_offset(chain.id, prior_offset)?,
            None => None,
        };
        let mut fab = Fabricator::new(
            chain.clone(),
            segment.clone(),
            prior,
            ingest,
            self.config.clone(),
        );
        craft_segment(&mut fab).map_err(flatten_craft_error)?;
        let mut crafted = fab.into_segment();
        crafted.state = segment.state;
        crafted.retry_count = segment.retry_count;
        *segment = crafted;
        Ok(())
    }
}

/// Folds a craft failure into the engine taxonomy without losing the
/// segment/stage rendering, so a failed segment records where crafting
/// broke. Retryability follows the underlying cause.
fn flatten_craft_error(err: CraftError) -> EngineError {
    let message = err.to_string();
    match err.source {
        EngineError::Transient { operation, .. } => EngineError::Transient { operation, message },
        EngineError::Config(config) => EngineError::Config(config),
        _ => ValidationError::new(err.stage, message).into(),
    }
}
