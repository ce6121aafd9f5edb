//! In-process block producer standing in for the host ledger.
//!
//! Transactions are queued with [`LocalChain::submit`] and executed in order
//! by [`LocalChain::produce_block`]. Each produced block gets the next height
//! (starting at 0, or one past the highest height already in the store) and
//! every transaction a receipt. A failed transaction leaves state untouched
//! but still consumes its nonce.

use std::collections::{HashMap, VecDeque};

use agent_core::{
    AgentId, BlockHeight, ErrorSeverity, MessageNumber, Nonce, SecurityCode, SenderKey,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zk::MessageProof;

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::ledger::MessageLedger;

/// Calls dispatched to the ledger.
#[derive(Clone, Debug)]
pub enum RuntimeCall {
    PopulateAgents,
    IsMessageValid {
        agent_id: AgentId,
        message_number: MessageNumber,
        security_code: SecurityCode,
    },
    SubmitMessage(Box<MessageProof>),
}

impl RuntimeCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PopulateAgents => "populate_agents",
            Self::IsMessageValid { .. } => "is_message_valid",
            Self::SubmitMessage(_) => "submit_message",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Transaction {
    pub sender: SenderKey,
    pub nonce: Nonce,
    pub call: RuntimeCall,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub call: String,
    pub sender: SenderKey,
    pub nonce: Nonce,
    pub status: TxStatus,
    pub error: Option<String>,
    pub severity: Option<ErrorSeverity>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: BlockHeight,
    pub receipts: Vec<TransactionReceipt>,
}

pub struct LocalChain {
    ledger: MessageLedger,
    next_height: BlockHeight,
    nonces: HashMap<SenderKey, Nonce>,
    pending: VecDeque<Transaction>,
}

impl LocalChain {
    /// Chain on top of `ledger`, resuming after the highest recorded height.
    pub fn new(ledger: MessageLedger) -> Result<Self> {
        let next_height = ledger
            .store()
            .latest_block_height()?
            .map_or(0, |height| height.saturating_add(1));

        Ok(Self {
            ledger,
            next_height,
            nonces: HashMap::new(),
            pending: VecDeque::new(),
        })
    }

    pub fn ledger(&self) -> &MessageLedger {
        &self.ledger
    }

    /// Height the next produced block will carry.
    pub fn next_height(&self) -> BlockHeight {
        self.next_height
    }

    pub fn next_nonce(&self, sender: &SenderKey) -> Nonce {
        self.nonces.get(sender).copied().unwrap_or(0)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Queues a call from `sender` and returns the nonce it was assigned.
    pub fn submit(&mut self, sender: SenderKey, call: RuntimeCall) -> Nonce {
        let nonce = self.next_nonce(&sender);
        self.nonces.insert(sender, nonce + 1);
        debug!(call = call.name(), %sender, nonce, "transaction queued");
        self.pending.push_back(Transaction {
            sender,
            nonce,
            call,
        });
        nonce
    }

    /// Executes every queued transaction in a new block.
    pub fn produce_block(&mut self) -> Block {
        let height = self.next_height;
        let mut receipts = Vec::with_capacity(self.pending.len());

        while let Some(tx) = self.pending.pop_front() {
            let ctx = ExecutionContext::new(height, tx.sender, tx.nonce);
            let call = tx.call.name().to_string();
            let outcome = self.dispatch(&ctx, tx.call);

            let receipt = match outcome {
                Ok(()) => TransactionReceipt {
                    call,
                    sender: tx.sender,
                    nonce: tx.nonce,
                    status: TxStatus::Success,
                    error: None,
                    severity: None,
                },
                Err(error) => {
                    info!(height, nonce = tx.nonce, %error, "transaction failed");
                    TransactionReceipt {
                        call,
                        sender: tx.sender,
                        nonce: tx.nonce,
                        status: TxStatus::Failed,
                        severity: Some(error.severity()),
                        error: Some(error.to_string()),
                    }
                }
            };
            receipts.push(receipt);
        }

        self.next_height += 1;
        debug!(height, transactions = receipts.len(), "block produced");
        Block { height, receipts }
    }

    fn dispatch(&mut self, ctx: &ExecutionContext, call: RuntimeCall) -> Result<()> {
        match call {
            RuntimeCall::PopulateAgents => self.ledger.populate_agents().map(|_| ()),
            RuntimeCall::IsMessageValid {
                agent_id,
                message_number,
                security_code,
            } => self
                .ledger
                .is_message_valid(agent_id, message_number, &security_code)
                .map(|_| ()),
            RuntimeCall::SubmitMessage(proof) => {
                self.ledger.submit_message(ctx, &proof).map(|_| ())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::InMemoryAgentStore;
    use zk::StubProver;

    fn chain() -> LocalChain {
        let ledger = MessageLedger::new(
            Arc::new(InMemoryAgentStore::new()),
            Arc::new(StubProver::default()),
        );
        LocalChain::new(ledger).expect("chain")
    }

    #[test]
    fn heights_start_at_zero_and_increment() {
        let mut chain = chain();
        assert_eq!(chain.produce_block().height, 0);
        assert_eq!(chain.produce_block().height, 1);
        assert_eq!(chain.next_height(), 2);
    }

    #[test]
    fn nonces_are_per_sender() {
        let mut chain = chain();
        let alice = SenderKey::from_seed("alice");
        let bob = SenderKey::from_seed("bob");
        assert_eq!(chain.submit(alice, RuntimeCall::PopulateAgents), 0);
        assert_eq!(chain.submit(alice, RuntimeCall::PopulateAgents), 1);
        assert_eq!(chain.submit(bob, RuntimeCall::PopulateAgents), 0);
        assert_eq!(chain.pending(), 3);

        let block = chain.produce_block();
        assert_eq!(block.receipts.len(), 3);
        assert!(block.receipts.iter().all(TransactionReceipt::is_success));
        assert_eq!(chain.pending(), 0);
    }

    #[test]
    fn failed_call_gets_failed_receipt() {
        let mut chain = chain();
        let alice = SenderKey::from_seed("alice");
        chain.submit(
            alice,
            RuntimeCall::IsMessageValid {
                agent_id: AgentId(1),
                message_number: 1,
                security_code: SecurityCode::new('1', '2'),
            },
        );

        let block = chain.produce_block();
        let receipt = &block.receipts[0];
        assert_eq!(receipt.status, TxStatus::Failed);
        assert_eq!(receipt.severity, Some(ErrorSeverity::Validation));
        assert!(receipt.error.as_deref().is_some_and(|e| e.contains("does not exist")));
        assert_eq!(chain.next_nonce(&alice), 1);
    }
}
