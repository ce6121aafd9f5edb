//! Message ledger: seeding, direct validity checks and proof-gated transitions.
//!
//! The ledger is the only writer of agent state. Proofs are produced
//! elsewhere (see [`crate::ProverPool`]) against a [`ValidatorClaim`] read from
//! the store; [`MessageLedger::submit_message`] verifies a proof, checks that
//! its claim is still the stored state and then applies the transition and
//! its history entry as one batch.
//!
//! Mutation takes `&mut self`, so submissions against one ledger are
//! serialized. Two proofs built from the same snapshot can therefore never
//! both be applied: the second one fails the stale-claim check.

use std::sync::Arc;

use agent_core::{
    AgentId, AgentKeyAtBlock, AgentState, AgentStateWithTxInfo, BlockHeight, MessageNumber,
    SecurityCode, ValidationError, ValidatorClaim, check_message, commit,
};
use tracing::{debug, info, warn};
use zk::{MessageProof, Prover};

use crate::config::{AgentSeed, default_seeds};
use crate::context::ExecutionContext;
use crate::error::{LedgerError, Result};
use crate::repository::{AgentStore, StoreBatch};

pub struct MessageLedger {
    store: Arc<dyn AgentStore>,
    verifier: Arc<dyn Prover>,
    seeds: Vec<AgentSeed>,
}

impl MessageLedger {
    /// Ledger over `store`, accepting proofs that `verifier` verifies.
    pub fn new(store: Arc<dyn AgentStore>, verifier: Arc<dyn Prover>) -> Self {
        Self {
            store,
            verifier,
            seeds: default_seeds(),
        }
    }

    /// Replaces the seed set used by [`Self::populate_agents`].
    pub fn with_seeds(mut self, seeds: Vec<AgentSeed>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn store(&self) -> &Arc<dyn AgentStore> {
        &self.store
    }

    pub fn verifier(&self) -> &Arc<dyn Prover> {
        &self.verifier
    }

    /// Registers the configured seed agents.
    pub fn populate_agents(&mut self) -> Result<Vec<AgentId>> {
        let seeds = self.seeds.clone();
        self.initialize_agents(&seeds)?;
        Ok(seeds.iter().map(|seed| seed.agent_id).collect())
    }

    /// Writes a fresh state (`last_message_number = 0`) for every seed.
    ///
    /// Existing agents are overwritten. All seeds land in one batch.
    pub fn initialize_agents(&mut self, seeds: &[AgentSeed]) -> Result<()> {
        let mut batch = StoreBatch::new();
        for seed in seeds {
            let commitment = commit(&seed.security_code).map_err(ValidationError::from)?;
            batch = batch.put_agent(seed.agent_id, AgentState::seeded(seed.agent_id, commitment));
        }
        if batch.is_empty() {
            debug!("no seed agents configured");
            return Ok(());
        }
        self.store.apply(batch)?;

        info!(agents = seeds.len(), "agents initialized");
        Ok(())
    }

    /// Pre-flight check with the same hard rules the circuit enforces.
    ///
    /// Returns `Ok(true)` when a message with `message_number` signed by
    /// `security_code` would be accepted for `agent_id`; otherwise the error
    /// names the failing rule. Never mutates state.
    pub fn is_message_valid(
        &self,
        agent_id: AgentId,
        message_number: MessageNumber,
        security_code: &SecurityCode,
    ) -> Result<bool> {
        let state = self.existing_agent(agent_id)?;
        check_message(&state, agent_id, message_number, security_code)?;
        Ok(true)
    }

    /// Claim a prover should build against for `agent_id`.
    pub fn claim_for(&self, agent_id: AgentId) -> Result<ValidatorClaim> {
        Ok(ValidatorClaim::new(self.existing_agent(agent_id)?))
    }

    /// Applies a proven message.
    ///
    /// 1. The proof must verify under the ledger's verifier.
    /// 2. Its public output must carry `is_valid`.
    /// 3. The claimed agent must exist and its stored state must equal the
    ///    claim.
    /// 4. The agent's sequence advances by one and the new state is recorded
    ///    under `(agent, ctx.block_height)` in the same batch. An entry
    ///    already at that key is only ever replaced by a higher message
    ///    number; after a re-seed within the same block the submission fails
    ///    with [`LedgerError::HistoryRegression`] instead.
    pub fn submit_message(
        &mut self,
        ctx: &ExecutionContext,
        proof: &MessageProof,
    ) -> Result<AgentState> {
        if !self.verifier.verify(proof)? {
            warn!(
                backend = %proof.backend(),
                agent = %proof.public_input.agent_id,
                "proof verification failed"
            );
            return Err(LedgerError::ProofRejected);
        }

        if !proof.public_output.is_valid {
            debug!(agent = %proof.public_input.agent_id, "proof carries invalid length flag");
            return Err(LedgerError::MessageNotValid);
        }

        let claim = &proof.public_input;
        let current = self.existing_agent(claim.agent_id)?;
        if current != claim.agent_state || current.agent_id != claim.agent_id {
            return Err(LedgerError::StaleClaim {
                agent: claim.agent_id,
                claimed: claim.agent_state.last_message_number,
                current: current.last_message_number,
            });
        }

        let next = current
            .advanced()
            .ok_or(LedgerError::SequenceExhausted(current.agent_id))?;
        let key = AgentKeyAtBlock::new(next.agent_id, ctx.block_height);
        if let Some(recorded) = self.store.agent_at_block(key)?
            && recorded.last_message_number >= next.last_message_number
        {
            return Err(LedgerError::HistoryRegression {
                agent: next.agent_id,
                height: ctx.block_height,
                recorded: recorded.last_message_number,
                next: next.last_message_number,
            });
        }

        let history = AgentStateWithTxInfo {
            last_message_number: next.last_message_number,
            security_code_hash: next.security_code_hash,
            block_height: ctx.block_height,
            nonce: ctx.nonce,
            sender: ctx.sender,
        };

        self.store.apply(
            StoreBatch::new()
                .put_agent(next.agent_id, next)
                .put_history(key, history),
        )?;

        info!(
            agent = %next.agent_id,
            last_message_number = next.last_message_number,
            height = ctx.block_height,
            nonce = ctx.nonce,
            "message accepted"
        );
        Ok(next)
    }

    pub fn agent_state(&self, agent_id: AgentId) -> Result<Option<AgentState>> {
        Ok(self.store.agent(agent_id)?)
    }

    pub fn agent_state_at_block(
        &self,
        agent_id: AgentId,
        block_height: BlockHeight,
    ) -> Result<Option<AgentStateWithTxInfo>> {
        Ok(self
            .store
            .agent_at_block(AgentKeyAtBlock::new(agent_id, block_height))?)
    }

    pub fn agent_history(&self, agent_id: AgentId) -> Result<Vec<AgentStateWithTxInfo>> {
        Ok(self.store.history(agent_id)?)
    }

    fn existing_agent(&self, agent_id: AgentId) -> Result<AgentState> {
        self.store
            .agent(agent_id)?
            .ok_or(LedgerError::Validation(ValidationError::AgentNotFound(
                agent_id,
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{MessageWitness, SenderKey};
    use zk::StubProver;

    use crate::repository::{FileAgentStore, InMemoryAgentStore};

    fn ledger() -> MessageLedger {
        let mut ledger = MessageLedger::new(
            Arc::new(InMemoryAgentStore::new()),
            Arc::new(StubProver::default()),
        );
        ledger.populate_agents().expect("populate");
        ledger
    }

    fn code(s: &str) -> SecurityCode {
        s.parse().expect("two-symbol code")
    }

    fn prove(ledger: &MessageLedger, number: u64, text: &str, secret: &str) -> MessageProof {
        let claim = ledger.claim_for(AgentId(1)).expect("claim");
        let witness = MessageWitness::new(number, text, AgentId(1), code(secret)).expect("fits");
        StubProver::default().prove(&claim, &witness).expect("prove")
    }

    fn ctx(height: BlockHeight) -> ExecutionContext {
        ExecutionContext::new(height, SenderKey::from_seed("alice"), height)
    }

    #[test]
    fn populate_seeds_default_agents() {
        let ledger = ledger();
        for id in [1, 2] {
            let state = ledger.agent_state(AgentId(id)).expect("read").expect("seeded");
            assert_eq!(state.last_message_number, 0);
            assert_eq!(state.agent_id, AgentId(id));
        }
        assert_eq!(ledger.agent_state(AgentId(3)).expect("read"), None);
    }

    #[test]
    fn direct_check_distinguishes_failures() {
        let ledger = ledger();
        assert!(ledger.is_message_valid(AgentId(1), 1, &code("12")).expect("valid"));
        assert!(matches!(
            ledger.is_message_valid(AgentId(9), 1, &code("12")),
            Err(LedgerError::Validation(ValidationError::AgentNotFound(_)))
        ));
        assert!(matches!(
            ledger.is_message_valid(AgentId(1), 0, &code("12")),
            Err(LedgerError::Validation(
                ValidationError::MessageNumberNotIncreasing { .. }
            ))
        ));
        assert!(matches!(
            ledger.is_message_valid(AgentId(1), 1, &code("56")),
            Err(LedgerError::Validation(
                ValidationError::SecurityCodeMismatch(_)
            ))
        ));
    }

    #[test]
    fn accepted_message_advances_and_records_history() {
        let mut ledger = ledger();
        let proof = prove(&ledger, 5, "Hello, World", "12");
        let next = ledger.submit_message(&ctx(7), &proof).expect("accepted");
        assert_eq!(next.last_message_number, 1);

        let entry = ledger
            .agent_state_at_block(AgentId(1), 7)
            .expect("read")
            .expect("recorded");
        assert_eq!(entry.last_message_number, 1);
        assert_eq!(entry.block_height, 7);
        assert_eq!(entry.nonce, 7);
        assert_eq!(entry.sender, SenderKey::from_seed("alice"));
        assert_eq!(entry.security_code_hash, next.security_code_hash);
    }

    #[test]
    fn invalid_length_is_soft_failure_without_writes() {
        let mut ledger = ledger();
        let proof = prove(&ledger, 5, "Hello", "12");
        let error = ledger.submit_message(&ctx(1), &proof).expect_err("rejected");
        assert!(matches!(error, LedgerError::MessageNotValid));
        assert!(error.severity().is_soft());
        assert_eq!(
            ledger
                .agent_state(AgentId(1))
                .expect("read")
                .expect("exists")
                .last_message_number,
            0
        );
        assert_eq!(ledger.agent_state_at_block(AgentId(1), 1).expect("read"), None);
    }

    #[test]
    fn forged_attestation_is_rejected() {
        let mut ledger = ledger();
        let claim = ledger.claim_for(AgentId(1)).expect("claim");
        let witness =
            MessageWitness::new(5, "Hello, World", AgentId(1), code("12")).expect("fits");
        let forged = StubProver::from_seed("someone-else")
            .prove(&claim, &witness)
            .expect("prove");
        assert!(matches!(
            ledger.submit_message(&ctx(1), &forged),
            Err(LedgerError::ProofRejected)
        ));
    }

    #[test]
    fn replayed_proof_is_stale() {
        let mut ledger = ledger();
        let proof = prove(&ledger, 5, "Hello, World", "12");
        ledger.submit_message(&ctx(1), &proof).expect("accepted");
        assert!(matches!(
            ledger.submit_message(&ctx(2), &proof),
            Err(LedgerError::StaleClaim {
                claimed: 0,
                current: 1,
                ..
            })
        ));
    }

    #[test]
    fn reseed_within_block_cannot_lower_history() {
        let mut ledger = ledger();
        let first = prove(&ledger, 5, "Hello, World", "12");
        ledger.submit_message(&ctx(7), &first).expect("first");
        let second = prove(&ledger, 6, "Hello, World", "12");
        ledger.submit_message(&ctx(7), &second).expect("second");

        ledger.populate_agents().expect("reseed");
        let error = ledger
            .submit_message(&ctx(7), &first)
            .expect_err("would lower history");
        assert!(matches!(
            error,
            LedgerError::HistoryRegression {
                height: 7,
                recorded: 2,
                next: 1,
                ..
            }
        ));
        assert!(error.severity().is_soft());

        let entry = ledger
            .agent_state_at_block(AgentId(1), 7)
            .expect("read")
            .expect("recorded");
        assert_eq!(entry.last_message_number, 2);
        let state = ledger.agent_state(AgentId(1)).expect("read").expect("exists");
        assert_eq!(state.last_message_number, 0);

        // A later block has no entry to protect.
        let next = ledger.submit_message(&ctx(8), &first).expect("new block");
        assert_eq!(next.last_message_number, 1);
    }

    #[test]
    fn empty_seed_list_skips_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(FileAgentStore::open(dir.path()).expect("open"));
        let mut ledger = MessageLedger::new(store.clone(), Arc::new(StubProver::default()))
            .with_seeds(Vec::new());

        assert!(ledger.populate_agents().expect("populate").is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn reseeding_resets_sequence() {
        let mut ledger = ledger();
        let proof = prove(&ledger, 5, "Hello, World", "12");
        ledger.submit_message(&ctx(1), &proof).expect("accepted");
        ledger.populate_agents().expect("repopulate");
        assert_eq!(
            ledger
                .agent_state(AgentId(1))
                .expect("read")
                .expect("exists")
                .last_message_number,
            0
        );
    }
}
