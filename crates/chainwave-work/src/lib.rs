//! Chainwave Work Scheduler
//!
//! The craft-ahead scheduling layer: a [`Leader`] plans segments ahead of
//! playback, [`Follower`]s claim and advance them through craft, dub, and
//! ship, and a [`Heartbeat`] revives chains whose worker disappeared. A
//! [`WorkManager`] assembles all of it and drives the loops on tokio
//! intervals.
//!
//! Concurrency rests on one primitive: the store's compare-and-swap claim.
//! Any number of workers may run ticks against the same store; each segment
//! is processed by exactly one of them.

pub mod follower;
pub mod heartbeat;
pub mod leader;
pub mod manager;
pub mod memory;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use follower::{Follower, FollowerReport, WorkOperation};
pub use heartbeat::Heartbeat;
pub use leader::{Leader, LeaderReport};
pub use manager::{TickReport, WorkManager, WorkSchedule};
pub use memory::{InMemoryStore, KeyOnlyDubService, NoopShipService};
pub use store::{ClaimOutcome, DubService, SegmentStore, ShipService};
