//! Worker tasks that run beside the ledger.
//!
//! Proof generation is the only background duty: it is pure, so it can run on
//! any number of workers while the ledger applies results one at a time.

mod metrics;
mod prover;

pub use metrics::{MetricsSnapshot, ProofMetrics};
pub use prover::ProverPool;
