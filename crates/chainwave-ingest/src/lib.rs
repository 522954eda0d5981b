//! Chainwave Ingest
//!
//! Materializes an access-scoped, flattened view of library source material
//! (an "Ingest") from a chain's bindings, computes derived summaries
//! ("Digests") over it, and caches both so that every craft stage within a
//! segment's fabrication sees one consistent, cheap-to-read view of the
//! library.
//!
//! # Cache contract
//!
//! Two `ingest()` calls with the same access scope and the same (possibly
//! reordered) bindings inside the TTL window return the same `Arc<Ingest>`
//! instance. After expiry a fresh Ingest reflecting the current library
//! state is built. The content hash is always recomputed; the other digests
//! are computed once per Ingest and live as long as it does.

pub mod cache;
pub mod digest;
pub mod ingest;
pub mod store;

pub use cache::{IngestCache, SystemTimeSource, TimeSource};
pub use digest::{ChordMarkovDigest, ChordProgressionDigest, MemeDigest, SequenceStyleDigest};
pub use ingest::Ingest;
pub use store::{AccessScope, LibraryStore, StoreError};
