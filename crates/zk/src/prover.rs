//! Universal prover interface for message proofs.
//!
//! Defines the proof envelope and the trait implemented by all backends.

use agent_core::{MessageWitness, ValidationError, ValidatorClaim, ValidatorOutput};
use serde::{Deserialize, Serialize};

/// Serialized proof bytes tagged with the backend that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofData {
    pub bytes: Vec<u8>,
    pub backend: ProofBackend,
}

/// Identifies which proving backend generated a proof.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProofBackend {
    Stub,
    Arkworks,
}

/// A proof together with its public input and public output.
///
/// The ledger only ever sees this envelope: the witness (message text,
/// message number, secret) stays with the prover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageProof {
    pub public_input: ValidatorClaim,
    pub public_output: ValidatorOutput,
    pub data: ProofData,
}

impl MessageProof {
    pub fn backend(&self) -> ProofBackend {
        self.data.backend
    }
}

/// Errors that can occur during proof generation or verification.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// The witness fails a hard validation rule; no proof is produced.
    #[error("Proof construction aborted: {0}")]
    Rejected(#[from] ValidationError),

    #[error("Circuit constraints not satisfied: {0}")]
    Unsatisfied(String),

    #[error("Circuit proof generation failed: {0}")]
    CircuitProofError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Attestation key rejected: {0}")]
    Attestation(String),

    #[error("Backend mismatch: expected {expected}, found {found}")]
    BackendMismatch {
        expected: ProofBackend,
        found: ProofBackend,
    },
}

impl ProofError {
    /// Whether the failure was caused by the submitted data rather than the
    /// backend itself.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Unsatisfied(_))
    }
}

/// Universal prover interface for all proving backends.
pub trait Prover: Send + Sync {
    /// Backend tag stamped on every proof this prover emits.
    fn backend(&self) -> ProofBackend;

    /// Proves that `witness` satisfies the validator against `claim`.
    ///
    /// Fails with [`ProofError::Rejected`] when a hard rule is violated. A
    /// message of the wrong length still proves, with
    /// `public_output.is_valid == false`.
    fn prove(
        &self,
        claim: &ValidatorClaim,
        witness: &MessageWitness,
    ) -> Result<MessageProof, ProofError>;

    /// Checks that the proof binds its own public input and output.
    ///
    /// `Ok(false)` means the proof is well-formed but does not verify; an
    /// error means it could not be checked at all.
    fn verify(&self, proof: &MessageProof) -> Result<bool, ProofError>;

    /// Rejects proofs emitted by another backend.
    fn ensure_backend(&self, proof: &MessageProof) -> Result<(), ProofError> {
        if proof.backend() != self.backend() {
            return Err(ProofError::BackendMismatch {
                expected: self.backend(),
                found: proof.backend(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn backend_names_round_trip() {
        for backend in ProofBackend::iter() {
            let parsed: ProofBackend = backend.to_string().parse().expect("known backend");
            assert_eq!(parsed, backend);
        }
        assert_eq!(ProofBackend::Arkworks.to_string(), "arkworks");
        assert!("risc0".parse::<ProofBackend>().is_err());
    }

    #[test]
    fn rejection_classification() {
        let rejected = ProofError::Rejected(ValidationError::AgentNotFound(1.into()));
        assert!(rejected.is_rejection());
        assert!(!ProofError::SerializationError("eof".into()).is_rejection());
    }
}
