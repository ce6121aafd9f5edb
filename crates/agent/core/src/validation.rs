//! Message validation: claims, witnesses and the shared predicate.
//!
//! A submission is checked in two layers:
//!
//! 1. [`check_message`] holds the hard rules (replay protection, knowledge of
//!    the secret, agent binding). Provers abort proof construction when it
//!    fails and the direct validity check reports its error unchanged, so both
//!    entry points reject for exactly the same reasons.
//! 2. [`evaluate`] runs those rules for a claim/witness pair and then folds
//!    the payload length check into the validity flag of the public result.
//!    A length failure never aborts; callers must inspect
//!    [`ValidatorOutput::is_valid`].

use serde::{Deserialize, Serialize};

use crate::commitment::{Commitment, commit};
use crate::field::Fp254;
use crate::message::{MessageText, REQUIRED_MESSAGE_LENGTH, SecurityCode};
use crate::state::{AgentId, AgentState, MessageNumber};
use crate::{CoreError, ErrorSeverity};

/// Public claim a proof is built against: the agent's state snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorClaim {
    pub agent_id: AgentId,
    pub agent_state: AgentState,
}

impl ValidatorClaim {
    /// Claim keyed by the state's own agent id.
    pub const fn new(agent_state: AgentState) -> Self {
        Self {
            agent_id: agent_state.agent_id,
            agent_state,
        }
    }

    pub const fn with_agent_id(agent_id: AgentId, agent_state: AgentState) -> Self {
        Self {
            agent_id,
            agent_state,
        }
    }
}

/// Private witness bundle assembled per submission attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageWitness {
    pub message_number: MessageNumber,
    pub message_text: MessageText,
    pub agent_id: AgentId,
    pub security_code: SecurityCode,
}

impl MessageWitness {
    /// Packs `text` into the message buffer; oversized payloads fail here.
    pub fn new(
        message_number: MessageNumber,
        text: &str,
        agent_id: AgentId,
        security_code: SecurityCode,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            message_number,
            message_text: MessageText::new(text)?,
            agent_id,
            security_code,
        })
    }
}

/// Public result of the validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorOutput {
    /// Echo of the claim's commitment.
    pub security_code_hash: Commitment,
    pub is_valid: bool,
}

impl ValidatorOutput {
    /// Validity flag as the circuit exposes it (0 or 1).
    pub fn is_valid_field(&self) -> Fp254 {
        Fp254::from(u64::from(self.is_valid))
    }
}

/// Reasons a submission is rejected by the shared predicate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Agent does not exist: {0}")]
    AgentNotFound(AgentId),

    #[error(
        "Message number must be greater than the last message number ({message_number} <= {last_message_number})"
    )]
    MessageNumberNotIncreasing {
        message_number: MessageNumber,
        last_message_number: MessageNumber,
    },

    #[error("Security code hash must match for agent {0}")]
    SecurityCodeMismatch(AgentId),

    #[error("Agent ID must match (expected {expected}, found {found})")]
    AgentIdMismatch { expected: AgentId, found: AgentId },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ValidationError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Core(error) => error.severity(),
            _ => ErrorSeverity::Validation,
        }
    }
}

/// Hard rules every accepted message satisfies against `state`.
///
/// Checked in order: the message number strictly exceeds the last accepted
/// one, the secret hashes to the stored commitment, and the submitted agent id
/// matches the state.
pub fn check_message(
    state: &AgentState,
    agent_id: AgentId,
    message_number: MessageNumber,
    security_code: &SecurityCode,
) -> Result<(), ValidationError> {
    if message_number <= state.last_message_number {
        return Err(ValidationError::MessageNumberNotIncreasing {
            message_number,
            last_message_number: state.last_message_number,
        });
    }

    if commit(security_code)? != state.security_code_hash {
        return Err(ValidationError::SecurityCodeMismatch(state.agent_id));
    }

    if state.agent_id != agent_id {
        return Err(ValidationError::AgentIdMismatch {
            expected: state.agent_id,
            found: agent_id,
        });
    }

    Ok(())
}

/// Native evaluation of the validator for a claim/witness pair.
pub fn evaluate(
    claim: &ValidatorClaim,
    witness: &MessageWitness,
) -> Result<ValidatorOutput, ValidationError> {
    check_message(
        &claim.agent_state,
        witness.agent_id,
        witness.message_number,
        &witness.security_code,
    )?;

    if claim.agent_id != claim.agent_state.agent_id {
        return Err(ValidationError::AgentIdMismatch {
            expected: claim.agent_state.agent_id,
            found: claim.agent_id,
        });
    }

    Ok(ValidatorOutput {
        security_code_hash: claim.agent_state.security_code_hash,
        is_valid: witness
            .message_text
            .has_exact_length(REQUIRED_MESSAGE_LENGTH),
    })
}
