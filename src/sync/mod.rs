//! Replica sync engine
//!
//! Applies change records to the replica file:
//! - Positioned range reads from the source (EOF tolerated)
//! - Drift detection against the already-synchronized prefix
//! - Best-effort drift repair with a single contiguous patch
//! - Cumulative byte tracking and a terminal verification pass

mod drift;
mod engine;
mod range;
#[cfg(test)]
mod tests;

pub use drift::{find_differences, DriftRepair, Verification};
pub use engine::{ApplyOutcome, EngineOptions, ReplicaSyncEngine, SyncPhase};
pub use range::read_range;
