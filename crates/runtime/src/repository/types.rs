//! Value types shared by the agent store backends.

use std::collections::BTreeMap;

use agent_core::{AgentId, AgentKeyAtBlock, AgentState, AgentStateWithTxInfo, BlockHeight};
use serde::{Deserialize, Serialize};

/// Writes applied to the store as one all-or-nothing unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreBatch {
    pub agents: Vec<(AgentId, AgentState)>,
    pub history: Vec<(AgentKeyAtBlock, AgentStateWithTxInfo)>,
}

impl StoreBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_agent(mut self, agent_id: AgentId, state: AgentState) -> Self {
        self.agents.push((agent_id, state));
        self
    }

    pub fn put_history(mut self, key: AgentKeyAtBlock, entry: AgentStateWithTxInfo) -> Self {
        self.history.push((key, entry));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.history.is_empty()
    }
}

/// Full contents of an agent store.
///
/// Both maps are ordered so file snapshots are byte-for-byte reproducible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub agents: BTreeMap<AgentId, AgentState>,
    pub history: BTreeMap<AgentKeyAtBlock, AgentStateWithTxInfo>,
}

impl StoreSnapshot {
    /// Applies `batch` in order; a later write to the same key wins.
    pub fn apply(&mut self, batch: StoreBatch) {
        self.agents.extend(batch.agents);
        self.history.extend(batch.history);
    }

    pub fn latest_block_height(&self) -> Option<BlockHeight> {
        self.history.keys().map(|key| key.block_height).max()
    }

    pub fn history_of(&self, agent_id: AgentId) -> Vec<AgentStateWithTxInfo> {
        let from = AgentKeyAtBlock::new(agent_id, 0);
        let to = AgentKeyAtBlock::new(agent_id, BlockHeight::MAX);
        self.history
            .range(from..=to)
            .map(|(_, entry)| *entry)
            .collect()
    }
}
