//! File-based AgentStore implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use agent_core::{AgentId, AgentKeyAtBlock, AgentState, AgentStateWithTxInfo, BlockHeight};

use crate::repository::{AgentStore, RepositoryError, Result, StoreBatch, StoreSnapshot};

const SNAPSHOT_FILE: &str = "agents.bin";

/// File-based implementation of AgentStore.
///
/// # File Format
///
/// The whole store lives in one bincode-encoded [`StoreSnapshot`] at
/// `{base_dir}/agents.bin`. Each batch writes a new snapshot to a temp file
/// and renames it over the old one, so a crash leaves either the previous or
/// the next snapshot on disk. Reads are served from an in-memory copy that is
/// only replaced after the rename succeeds.
pub struct FileAgentStore {
    path: PathBuf,
    tables: RwLock<StoreSnapshot>,
}

impl FileAgentStore {
    /// Open (or create) a store under `base_dir`.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir).map_err(RepositoryError::Io)?;
        let path = base_dir.join(SNAPSHOT_FILE);

        let tables = if path.exists() {
            let bytes = fs::read(&path).map_err(RepositoryError::Io)?;
            let snapshot: StoreSnapshot = bincode::deserialize(&bytes).map_err(|e| {
                RepositoryError::CorruptedData(format!("{}: {}", path.display(), e))
            })?;
            tracing::debug!(
                agents = snapshot.agents.len(),
                history = snapshot.history.len(),
                "Loaded agent store from {}",
                path.display()
            );
            snapshot
        } else {
            StoreSnapshot::default()
        };

        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let temp_path = self.path.with_extension("bin.tmp");

        let bytes = bincode::serialize(snapshot)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved agent store to {}", self.path.display());
        Ok(())
    }
}

impl AgentStore for FileAgentStore {
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

        let mut next = tables.clone();
        next.apply(batch);
        self.persist(&next)?;
        *tables = next;
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
