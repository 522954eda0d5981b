//! Chain time arithmetic.
//!
//! All segment timing is expressed in microseconds since the chain's epoch,
//! as a signed 64-bit count. A trait abstracts "now" so schedulers and
//! tests share the same arithmetic.

/// Microseconds since a chain's epoch.
pub type ChainMicros = i64;

/// Microseconds per second, the fixed time resolution of segment timing.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Converts whole seconds to chain microseconds.
pub fn micros_from_seconds(seconds: u64) -> ChainMicros {
    seconds as i64 * MICROS_PER_SECOND
}

/// Converts chain microseconds to fractional seconds.
pub fn seconds_from_micros(micros: ChainMicros) -> f64 {
    micros as f64 / MICROS_PER_SECOND as f64
}

/// Source of the current chain time, injected into schedulers so tests can
/// drive time explicitly.
pub trait ChainClock: Send + Sync {
    /// Current time in microseconds since the chain epoch.
    fn now_micros(&self) -> ChainMicros;
}

/// Wall-clock implementation: microseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemChainClock;

impl ChainClock for SystemChainClock {
    fn now_micros(&self) -> ChainMicros {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0)
    }
}
