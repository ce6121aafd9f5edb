//! Repository contract for agent state and its per-block history.

use agent_core::{AgentId, AgentKeyAtBlock, AgentState, AgentStateWithTxInfo, BlockHeight};

use super::error::Result;
use super::types::StoreBatch;

/// Keyed persistence for the two agent mappings.
///
/// - `AgentId -> AgentState`: current state of every registered agent
/// - `(AgentId, BlockHeight) -> AgentStateWithTxInfo`: snapshot written by
///   each accepted submission
///
/// Absent keys return `Ok(None)`, never a default value. All writes go
/// through [`AgentStore::apply`], which either commits the whole batch or
/// leaves the store untouched.
pub trait AgentStore: Send + Sync {
    /// Current state of an agent.
    fn agent(&self, agent_id: AgentId) -> Result<Option<AgentState>>;

    /// Snapshot recorded for an agent at a block.
    fn agent_at_block(&self, key: AgentKeyAtBlock) -> Result<Option<AgentStateWithTxInfo>>;

    /// Commit a batch atomically.
    fn apply(&self, batch: StoreBatch) -> Result<()>;

    /// Registered agent ids in ascending order.
    fn agent_ids(&self) -> Result<Vec<AgentId>>;

    /// All history entries of an agent, ordered by block height.
    fn history(&self, agent_id: AgentId) -> Result<Vec<AgentStateWithTxInfo>>;

    /// Highest block height present in the history mapping.
    fn latest_block_height(&self) -> Result<Option<BlockHeight>>;

    fn set_agent(&self, agent_id: AgentId, state: AgentState) -> Result<()> {
        self.apply(StoreBatch::new().put_agent(agent_id, state))
    }

    fn set_agent_at_block(
        &self,
        key: AgentKeyAtBlock,
        entry: AgentStateWithTxInfo,
    ) -> Result<()> {
        self.apply(StoreBatch::new().put_history(key, entry))
    }
}
