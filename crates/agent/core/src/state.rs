//! Agent state and block-history records.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::commitment::Commitment;
use crate::field::Fp254;

/// Sequence number carried by every message.
pub type MessageNumber = u64;

/// Height of a block produced by the host ledger.
pub type BlockHeight = u64;

/// Per-sender transaction counter supplied by the host ledger.
pub type Nonce = u64;

/// Identifier of a registered agent.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AgentId(pub u64);

impl AgentId {
    pub fn to_field(self) -> Fp254 {
        Fp254::from(self.0)
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Current state of an agent.
///
/// `last_message_number` never decreases for a given agent and the
/// commitment is fixed for the agent's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentState {
    pub last_message_number: MessageNumber,
    pub security_code_hash: Commitment,
    pub agent_id: AgentId,
}

impl AgentState {
    /// Fresh state for a newly seeded agent.
    pub const fn seeded(agent_id: AgentId, security_code_hash: Commitment) -> Self {
        Self {
            last_message_number: 0,
            security_code_hash,
            agent_id,
        }
    }

    /// State after one accepted message, or `None` once the sequence is exhausted.
    pub fn advanced(&self) -> Option<Self> {
        Some(Self {
            last_message_number: self.last_message_number.checked_add(1)?,
            ..*self
        })
    }
}

/// Key of the per-block history index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AgentKeyAtBlock {
    pub agent_id: AgentId,
    pub block_height: BlockHeight,
}

impl AgentKeyAtBlock {
    pub const fn new(agent_id: AgentId, block_height: BlockHeight) -> Self {
        Self {
            agent_id,
            block_height,
        }
    }
}

/// Public key identifying the sender of a transaction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SenderKey(pub [u8; 32]);

impl SenderKey {
    /// Deterministic key derived from a seed string (local chains and tests).
    pub fn from_seed(seed: &str) -> Self {
        Self(Sha256::digest(seed.as_bytes()).into())
    }
}

impl core::fmt::Display for SenderKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl core::fmt::Debug for SenderKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SenderKey({}..)", &hex::encode(&self.0[..4]))
    }
}

/// Snapshot of an agent's state at a block, with the accepting transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStateWithTxInfo {
    pub last_message_number: MessageNumber,
    pub security_code_hash: Commitment,
    pub block_height: BlockHeight,
    pub nonce: Nonce,
    pub sender: SenderKey,
}
