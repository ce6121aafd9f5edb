//! Ledger runtime for the agent message protocol.
//!
//! This crate hosts the stateful side of the protocol: the agent store, the
//! ledger that verifies proofs and applies transitions, an in-process chain
//! that assigns block heights and nonces, and the worker pool that generates
//! proofs off the ledger's path.
//!
//! Modules are organized by responsibility:
//! - [`ledger`] owns agent state transitions and the direct validity check
//! - [`chain`] batches calls into blocks and reports per-transaction receipts
//! - [`builder`] assembles store, prover and chain from a [`RuntimeConfig`]
//! - [`repository`] provides the in-memory and file-backed agent stores
//! - [`workers`] keeps proof generation internal to the crate
//! - [`config`] and [`error`] hold configuration loading and error types
pub mod builder;
pub mod chain;
pub mod config;
pub mod context;
pub mod error;
pub mod ledger;
pub mod repository;

mod workers;

pub use builder::{LedgerBuilder, LedgerSetup};
pub use chain::{Block, LocalChain, RuntimeCall, Transaction, TransactionReceipt, TxStatus};
pub use config::{AgentSeed, ConfigError, RuntimeConfig, default_seeds, parse_seed_list};
pub use context::ExecutionContext;
pub use error::{LedgerError, Result};
pub use ledger::MessageLedger;
pub use repository::{
    AgentStore, FileAgentStore, InMemoryAgentStore, RepositoryError, StoreBatch, StoreSnapshot,
};
pub use workers::{MetricsSnapshot, ProofMetrics, ProverPool};
