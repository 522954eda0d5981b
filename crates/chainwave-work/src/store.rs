//! The persistence boundary for chains and segments, plus the dub/ship
//! collaborators.

use chainwave_ingest::StoreError;
use chainwave_model::{Chain, ChainId, ChainState, EngineError, Segment, SegmentId, SegmentState};

/// Result of a compare-and-swap claim attempt on one segment.
///
/// `AlreadyTaken` is the normal contention signal between concurrent
/// workers and is never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The claim succeeded; the caller holds the segment exclusively.
    Claimed(Segment),
    /// Another worker moved the segment out of the expected state first.
    AlreadyTaken,
    /// No segment with that id exists.
    NotFound,
}

/// Persistence for chains and segments.
///
/// Implementations must make [`SegmentStore::claim_segment`] atomic with
/// respect to concurrent claims on the same segment; everything else may be
/// plain reads and writes. An in-memory implementation ships in
/// [`crate::memory`] for tests and demos.
pub trait SegmentStore: Send + Sync {
    /// All chains currently in a lifecycle state.
    fn chains_in_state(&self, state: ChainState) -> Result<Vec<Chain>, StoreError>;

    /// Loads one chain.
    fn load_chain(&self, id: ChainId) -> Result<Option<Chain>, StoreError>;

    /// Persists a chain's current fields.
    fn save_chain(&self, chain: &Chain) -> Result<(), StoreError>;

    /// Persists a new segment, assigning its id.
    ///
    /// Rejects the write unless the offset is exactly one past the chain's
    /// current latest (or 0 for the first segment), so offsets stay
    /// contiguous no matter what the caller computed.
    fn create_segment(&self, segment: Segment) -> Result<Segment, StoreError>;

    /// Persists a segment's current fields.
    fn save_segment(&self, segment: &Segment) -> Result<(), StoreError>;

    /// Loads one segment.
    fn load_segment(&self, id: SegmentId) -> Result<Option<Segment>, StoreError>;

    /// The highest-offset segment of a chain.
    fn latest_segment(&self, chain_id: ChainId) -> Result<Option<Segment>, StoreError>;

    /// The segment at one offset of a chain.
    fn segment_at_offset(
        &self,
        chain_id: ChainId,
        offset: u64,
    ) -> Result<Option<Segment>, StoreError>;

    /// Up to `limit` segments currently in a lifecycle state, ordered by
    /// chain then offset.
    fn segments_in_state(
        &self,
        state: SegmentState,
        limit: usize,
    ) -> Result<Vec<Segment>, StoreError>;

    /// Atomically swaps a segment from `from` to `to` if and only if it is
    /// still in `from`.
    ///
    /// A swap into `Claimed` must record `from` on the segment's
    /// `claimed_from`, and any write leaving `Claimed` must clear it; the
    /// heartbeat releases abandoned claims through that record.
    fn claim_segment(
        &self,
        id: SegmentId,
        from: SegmentState,
        to: SegmentState,
    ) -> Result<ClaimOutcome, StoreError>;
}

/// Renders a crafted segment to audio, returning its waveform key.
pub trait DubService: Send + Sync {
    /// Renders one segment; the returned key identifies the waveform in
    /// whatever storage the implementation writes to.
    fn dub(&self, chain: &Chain, segment: &Segment) -> Result<String, EngineError>;
}

/// Publishes a dubbed segment to its output.
pub trait ShipService: Send + Sync {
    /// Publishes one segment.
    fn ship(&self, chain: &Chain, segment: &Segment) -> Result<(), EngineError>;
}
