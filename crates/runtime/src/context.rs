//! Host ledger context consumed by state transitions.

use agent_core::{BlockHeight, Nonce, SenderKey};
use serde::{Deserialize, Serialize};

/// Block and transaction metadata of the call being executed.
///
/// The block height is an opaque external clock; the ledger only uses it as
/// the history key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub block_height: BlockHeight,
    pub sender: SenderKey,
    pub nonce: Nonce,
}

impl ExecutionContext {
    pub const fn new(block_height: BlockHeight, sender: SenderKey, nonce: Nonce) -> Self {
        Self {
            block_height,
            sender,
            nonce,
        }
    }
}
