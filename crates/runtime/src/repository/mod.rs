//! Repository layer for agent state.
//!
//! Two mappings are kept per store:
//! - current agent state keyed by agent id
//! - per-block history keyed by (agent id, block height)

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::FileAgentStore;
pub use memory::InMemoryAgentStore;
pub use traits::AgentStore;
pub use types::{StoreBatch, StoreSnapshot};
