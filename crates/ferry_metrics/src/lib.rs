//! Ferry Metrics - named counters for bridge instrumentation
//!
//! Counters only exist when the `metrics` feature is enabled. Without it every
//! call compiles down to nothing and reads return zero.
//!
//! # Usage
//!
//! ```ignore
//! use ferry_metrics::Counter;
//!
//! let mut counter = Counter::new();
//! counter.add("identity.hit", 1);
//! assert_eq!(counter.get("identity.hit"), 1);
//! ```

#[cfg(feature = "metrics")]
mod counter;

#[cfg(feature = "metrics")]
pub use counter::Counter;

// ============================================================================
// No-op stub when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn add(&mut self, _name: &'static str, _amount: usize) {}
    pub fn get(&self, _name: &str) -> usize { 0 }
    pub fn snapshot(&self) -> Vec<(&'static str, usize)> { Vec::new() }
}
