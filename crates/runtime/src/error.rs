//! Unified error type surfaced by the ledger.
//!
//! Wraps failures from proof verification, the shared validation predicate,
//! repositories and worker coordination so callers can classify them through
//! [`ErrorSeverity`].

use agent_core::{AgentId, BlockHeight, ErrorSeverity, MessageNumber, ValidationError};
use thiserror::Error;
use zk::{ProofBackend, ProofError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("proof verification failed")]
    ProofRejected,

    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error("Message is not valid")]
    MessageNotValid,

    #[error(
        "stale claim for agent {agent}: proof built after message {claimed}, current is {current}"
    )]
    StaleClaim {
        agent: AgentId,
        claimed: MessageNumber,
        current: MessageNumber,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "history for agent {agent} at block {height} already records message {recorded}, not lowering it to {next}"
    )]
    HistoryRegression {
        agent: AgentId,
        height: BlockHeight,
        recorded: MessageNumber,
        next: MessageNumber,
    },

    #[error("message sequence exhausted for agent {0}")]
    SequenceExhausted(AgentId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{0} backend not compiled into this build")]
    BackendUnavailable(ProofBackend),

    #[error("prover worker failed: {0}")]
    Worker(String),
}

impl LedgerError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ProofRejected | Self::Repository(_) | Self::BackendUnavailable(_) => {
                ErrorSeverity::Fatal
            }
            Self::Proof(error) if error.is_rejection() => ErrorSeverity::Validation,
            Self::Proof(_) => ErrorSeverity::Fatal,
            Self::MessageNotValid | Self::StaleClaim { .. } | Self::HistoryRegression { .. } => {
                ErrorSeverity::Validation
            }
            Self::Validation(error) => error.severity(),
            Self::SequenceExhausted(_) | Self::Worker(_) => ErrorSeverity::Internal,
        }
    }
}
