//! In-memory store and collaborators, for tests and the CLI demo.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chainwave_ingest::{AccessScope, LibraryStore, StoreError};
use chainwave_model::{
    BindingTarget, Chain, ChainBinding, ChainId, ChainState, EngineError, LibraryContent, Segment,
    SegmentId, SegmentState,
};

use crate::store::{ClaimOutcome, DubService, SegmentStore, ShipService};

struct Inner {
    chains: BTreeMap<ChainId, Chain>,
    segments: BTreeMap<SegmentId, Segment>,
    next_segment_id: u64,
    content: LibraryContent,
}

/// A single-process store backing both the segment and library boundaries.
///
/// All state sits behind one mutex; claim atomicity falls out of holding
/// the lock across the compare-and-swap.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::with_content(LibraryContent::default())
    }

    /// Creates a store seeded with library content.
    pub fn with_content(content: LibraryContent) -> Self {
        Self {
            inner: Mutex::new(Inner {
                chains: BTreeMap::new(),
                segments: BTreeMap::new(),
                next_segment_id: 0,
                content,
            }),
        }
    }

    /// Inserts or replaces a chain directly, bypassing transition checks.
    pub fn insert_chain(&self, chain: Chain) {
        let mut inner = self.lock();
        inner.chains.insert(chain.id, chain);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-write; state is unusable.
        self.inner.lock().expect("in-memory store lock poisoned")
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentStore for InMemoryStore {
    fn chains_in_state(&self, state: ChainState) -> Result<Vec<Chain>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .chains
            .values()
            .filter(|c| c.state == state)
            .cloned()
            .collect())
    }

    fn load_chain(&self, id: ChainId) -> Result<Option<Chain>, StoreError> {
        Ok(self.lock().chains.get(&id).cloned())
    }

    fn save_chain(&self, chain: &Chain) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.chains.contains_key(&chain.id) {
            return Err(StoreError::new("save_chain", format!("no chain {}", chain.id)));
        }
        inner.chains.insert(chain.id, chain.clone());
        Ok(())
    }

    fn create_segment(&self, mut segment: Segment) -> Result<Segment, StoreError> {
        let mut inner = self.lock();
        let latest = inner
            .segments
            .values()
            .filter(|s| s.chain_id == segment.chain_id)
            .map(|s| s.offset)
            .max();
        let expected = latest.map(|o| o + 1).unwrap_or(0);
        if segment.offset != expected {
            return Err(StoreError::new(
                "create_segment",
                format!(
                    "chain {} expects offset {expected}, got {}",
                    segment.chain_id, segment.offset
                ),
            ));
        }
        inner.next_segment_id += 1;
        segment.id = SegmentId(inner.next_segment_id);
        inner.segments.insert(segment.id, segment.clone());
        Ok(segment)
    }

    fn save_segment(&self, segment: &Segment) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.segments.contains_key(&segment.id) {
            return Err(StoreError::new(
                "save_segment",
                format!("no segment {}", segment.id),
            ));
        }
        let mut segment = segment.clone();
        // The claim marker only means something while the claim is held.
        if segment.state != SegmentState::Claimed {
            segment.claimed_from = None;
        }
        inner.segments.insert(segment.id, segment);
        Ok(())
    }

    fn load_segment(&self, id: SegmentId) -> Result<Option<Segment>, StoreError> {
        Ok(self.lock().segments.get(&id).cloned())
    }

    fn latest_segment(&self, chain_id: ChainId) -> Result<Option<Segment>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .segments
            .values()
            .filter(|s| s.chain_id == chain_id)
            .max_by_key(|s| s.offset)
            .cloned())
    }

    fn segment_at_offset(
        &self,
        chain_id: ChainId,
        offset: u64,
    ) -> Result<Option<Segment>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .segments
            .values()
            .find(|s| s.chain_id == chain_id && s.offset == offset)
            .cloned())
    }

    fn segments_in_state(
        &self,
        state: SegmentState,
        limit: usize,
    ) -> Result<Vec<Segment>, StoreError> {
        let inner = self.lock();
        let mut matching: Vec<Segment> = inner
            .segments
            .values()
            .filter(|s| s.state == state)
            .cloned()
            .collect();
        matching.sort_by_key(|s| (s.chain_id, s.offset));
        matching.truncate(limit);
        Ok(matching)
    }

    fn claim_segment(
        &self,
        id: SegmentId,
        from: SegmentState,
        to: SegmentState,
    ) -> Result<ClaimOutcome, StoreError> {
        let mut inner = self.lock();
        let Some(segment) = inner.segments.get_mut(&id) else {
            return Ok(ClaimOutcome::NotFound);
        };
        if segment.state != from {
            return Ok(ClaimOutcome::AlreadyTaken);
        }
        segment.state = to;
        segment.claimed_from = (to == SegmentState::Claimed).then_some(from);
        Ok(ClaimOutcome::Claimed(segment.clone()))
    }
}

impl LibraryStore for InMemoryStore {
    fn load_library_entities(
        &self,
        _scope: &AccessScope,
        bindings: &[ChainBinding],
    ) -> Result<LibraryContent, StoreError> {
        let inner = self.lock();
        let mut out = LibraryContent::default();
        for binding in bindings {
            match binding.target {
                BindingTarget::Library(id) => {
                    out.libraries
                        .extend(inner.content.libraries.iter().filter(|l| l.id == id).cloned());
                    out.programs.extend(
                        inner
                            .content
                            .programs
                            .iter()
                            .filter(|p| p.library_id == id)
                            .cloned(),
                    );
                    out.instruments.extend(
                        inner
                            .content
                            .instruments
                            .iter()
                            .filter(|i| i.library_id == id)
                            .cloned(),
                    );
                }
                BindingTarget::Program(id) => {
                    out.programs
                        .extend(inner.content.programs.iter().filter(|p| p.id == id).cloned());
                }
                BindingTarget::Instrument(id) => {
                    out.instruments.extend(
                        inner.content.instruments.iter().filter(|i| i.id == id).cloned(),
                    );
                }
            }
        }
        // A direct binding may duplicate a library binding's entity.
        out.programs.sort_by_key(|p| p.id);
        out.programs.dedup_by_key(|p| p.id);
        out.instruments.sort_by_key(|i| i.id);
        out.instruments.dedup_by_key(|i| i.id);
        Ok(out)
    }
}

/// Dub collaborator that derives waveform keys without rendering audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyOnlyDubService;

impl DubService for KeyOnlyDubService {
    fn dub(&self, chain: &Chain, segment: &Segment) -> Result<String, EngineError> {
        Ok(format!(
            "chain-{}/segment-{}.wav",
            chain.id.0, segment.offset
        ))
    }
}

/// Ship collaborator that publishes nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopShipService;

impl ShipService for NoopShipService {
    fn ship(&self, _chain: &Chain, _segment: &Segment) -> Result<(), EngineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use pretty_assertions::assert_eq;

    use chainwave_model::ChainType;

    use super::*;

    fn chain(id: u64) -> Chain {
        let mut chain = Chain::new(ChainId(id), ChainType::Production, 0);
        chain.state = ChainState::Fabricate;
        chain
    }

    #[test]
    fn create_segment_enforces_contiguous_offsets() {
        let store = InMemoryStore::new();
        store.insert_chain(chain(1));
        let first = store
            .create_segment(Segment::planned(SegmentId(0), ChainId(1), 0, 0))
            .unwrap();
        assert_eq!(first.offset, 0);
        let err = store
            .create_segment(Segment::planned(SegmentId(0), ChainId(1), 2, 0))
            .unwrap_err();
        assert_eq!(err.operation, "create_segment");
        let second = store
            .create_segment(Segment::planned(SegmentId(0), ChainId(1), 1, 0))
            .unwrap();
        assert_eq!(second.offset, 1);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn claim_is_exclusive_across_threads() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_chain(chain(1));
        let segment = store
            .create_segment(Segment::planned(SegmentId(0), ChainId(1), 0, 0))
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store
                    .claim_segment(segment.id, SegmentState::Planned, SegmentState::Claimed)
                    .unwrap()
            }));
        }
        let outcomes: Vec<ClaimOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = outcomes
            .iter()
            .filter(|o| matches!(o, ClaimOutcome::Claimed(_)))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(outcomes.len() - wins, 7);
    }

    #[test]
    fn claims_record_their_source_state_until_released() {
        let store = InMemoryStore::new();
        store.insert_chain(chain(1));
        let segment = store
            .create_segment(Segment::planned(SegmentId(0), ChainId(1), 0, 0))
            .unwrap();

        let outcome = store
            .claim_segment(segment.id, SegmentState::Planned, SegmentState::Claimed)
            .unwrap();
        let ClaimOutcome::Claimed(claimed) = outcome else {
            panic!("claim should succeed");
        };
        assert_eq!(claimed.claimed_from, Some(SegmentState::Planned));

        let mut released = claimed;
        released.state = SegmentState::Crafted;
        store.save_segment(&released).unwrap();
        let stored = store.load_segment(segment.id).unwrap().unwrap();
        assert_eq!(stored.claimed_from, None);
    }

    #[test]
    fn claim_of_missing_segment_is_not_found() {
        let store = InMemoryStore::new();
        let outcome = store
            .claim_segment(SegmentId(99), SegmentState::Planned, SegmentState::Claimed)
            .unwrap();
        assert_eq!(outcome, ClaimOutcome::NotFound);
    }

    #[test]
    fn segments_in_state_orders_by_chain_then_offset() {
        let store = InMemoryStore::new();
        store.insert_chain(chain(1));
        store.insert_chain(chain(2));
        for offset in 0..3 {
            store
                .create_segment(Segment::planned(SegmentId(0), ChainId(2), offset, 0))
                .unwrap();
            store
                .create_segment(Segment::planned(SegmentId(0), ChainId(1), offset, 0))
                .unwrap();
        }
        let listed = store.segments_in_state(SegmentState::Planned, 4).unwrap();
        let keys: Vec<(ChainId, u64)> = listed.iter().map(|s| (s.chain_id, s.offset)).collect();
        assert_eq!(
            keys,
            vec![
                (ChainId(1), 0),
                (ChainId(1), 1),
                (ChainId(1), 2),
                (ChainId(2), 0),
            ]
        );
    }
}
