//! In-memory AgentStore implementation for tests and local runs.

use std::sync::RwLock;

use agent_core::{AgentId, AgentKeyAtBlock, AgentState, AgentStateWithTxInfo, BlockHeight};

use crate::repository::{AgentStore, RepositoryError, Result, StoreBatch, StoreSnapshot};

/// In-memory implementation of AgentStore.
///
/// Both mappings sit behind one lock so a batch is never observed half
/// applied.
#[derive(Debug, Default)]
pub struct InMemoryAgentStore {
    tables: RwLock<StoreSnapshot>,
}

impl InMemoryAgentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `snapshot`.
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.clone())
    }
}

impl AgentStore for InMemoryAgentStore {
    fn agent(&self, agent_id: AgentId) -> Result<Option<AgentState>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.agents.get(&agent_id).copied())
    }

    fn agent_at_block(&self, key: AgentKeyAtBlock) -> Result<Option<AgentStateWithTxInfo>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.history.get(&key).copied())
    }

    fn apply(&self, batch: StoreBatch) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        tables.apply(batch);
        Ok(())
    }

    fn agent_ids(&self) -> Result<Vec<AgentId>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.agents.keys().copied().collect())
    }

    fn history(&self, agent_id: AgentId) -> Result<Vec<AgentStateWithTxInfo>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.history_of(agent_id))
    }

    fn latest_block_height(&self) -> Result<Option<BlockHeight>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(tables.latest_block_height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{Commitment, Fp254, SenderKey};

    fn state(id: u64, last: u64) -> AgentState {
        AgentState {
            last_message_number: last,
            security_code_hash: Commitment::new(Fp254::from(42u64)),
            agent_id: AgentId(id),
        }
    }

    fn entry(last: u64, height: BlockHeight) -> AgentStateWithTxInfo {
        AgentStateWithTxInfo {
            last_message_number: last,
            security_code_hash: Commitment::new(Fp254::from(42u64)),
            block_height: height,
            nonce: 0,
            sender: SenderKey::from_seed("alice"),
        }
    }

    #[test]
    fn absent_keys_are_none() {
        let store = InMemoryAgentStore::new();
        assert_eq!(store.agent(AgentId(1)).expect("read"), None);
        assert_eq!(
            store
                .agent_at_block(AgentKeyAtBlock::new(AgentId(1), 0))
                .expect("read"),
            None
        );
        assert_eq!(store.latest_block_height().expect("read"), None);
    }

    #[test]
    fn batch_writes_both_mappings() {
        let store = InMemoryAgentStore::new();
        let key = AgentKeyAtBlock::new(AgentId(1), 3);
        store
            .apply(
                StoreBatch::new()
                    .put_agent(AgentId(1), state(1, 1))
                    .put_history(key, entry(1, 3)),
            )
            .expect("apply");

        assert_eq!(store.agent(AgentId(1)).expect("read"), Some(state(1, 1)));
        assert_eq!(store.agent_at_block(key).expect("read"), Some(entry(1, 3)));
        assert_eq!(store.latest_block_height().expect("read"), Some(3));
    }

    #[test]
    fn history_is_scoped_to_agent_and_ordered() {
        let store = InMemoryAgentStore::new();
        store
            .set_agent_at_block(AgentKeyAtBlock::new(AgentId(1), 5), entry(2, 5))
            .expect("write");
        store
            .set_agent_at_block(AgentKeyAtBlock::new(AgentId(1), 2), entry(1, 2))
            .expect("write");
        store
            .set_agent_at_block(AgentKeyAtBlock::new(AgentId(2), 3), entry(1, 3))
            .expect("write");

        let heights: Vec<_> = store
            .history(AgentId(1))
            .expect("read")
            .iter()
            .map(|e| e.block_height)
            .collect();
        assert_eq!(heights, vec![2, 5]);
    }

    #[test]
    fn reseeding_overwrites() {
        let store = InMemoryAgentStore::new();
        store.set_agent(AgentId(1), state(1, 7)).expect("write");
        store.set_agent(AgentId(1), state(1, 0)).expect("write");
        assert_eq!(store.agent(AgentId(1)).expect("read"), Some(state(1, 0)));
        assert_eq!(store.agent_ids().expect("read"), vec![AgentId(1)]);
    }
}
