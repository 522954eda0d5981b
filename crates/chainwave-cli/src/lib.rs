//! Chainwave CLI
//!
//! Commands for running and inspecting the fabrication engine against the
//! in-memory store: a bounded `demo` fabrication, a continuous `run` loop,
//! and `check-config` validation.

pub mod commands;
pub mod fixture;
pub mod logger;
