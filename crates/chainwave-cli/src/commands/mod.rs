//! Command implementations.

pub mod check_config;
pub mod demo;
pub mod run;

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};

use chainwave_ingest::{AccessScope, LibraryStore};
use chainwave_model::{
    Chain, ChainBinding, ChainId, ChainState, ChainType, EngineConfig, SystemChainClock,
};
use chainwave_work::{
    InMemoryStore, KeyOnlyDubService, NoopShipService, SegmentStore, WorkManager, WorkSchedule,
};

use crate::fixture::{demo_content, DEMO_LIBRARY};

/// Loads and validates an engine config file, or the defaults when absent.
pub(crate) fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path}"))?;
            let config = EngineConfig::from_json(&json)
                .with_context(|| format!("invalid config in {path}"))?;
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Assembles a manager over the in-memory store with one fabricating demo
/// chain, returning both so callers can inspect the store afterwards.
pub(crate) fn demo_manager(
    config: EngineConfig,
    schedule: WorkSchedule,
) -> Result<(Arc<InMemoryStore>, WorkManager)> {
    let store = Arc::new(InMemoryStore::with_content(demo_content()));
    let mut chain = Chain::new(ChainId(1), ChainType::Production, 0)
        .with_binding(ChainBinding::library(DEMO_LIBRARY));
    chain.state = ChainState::Fabricate;
    store.insert_chain(chain);

    let manager = WorkManager::new(
        Arc::clone(&store) as Arc<dyn SegmentStore>,
        Arc::clone(&store) as Arc<dyn LibraryStore>,
        AccessScope::new("demo"),
        Arc::new(KeyOnlyDubService),
        Arc::new(NoopShipService),
        Arc::new(SystemChainClock),
        config,
        schedule,
    )?;
    Ok((store, manager))
}
