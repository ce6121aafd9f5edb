//! Proofs generated in parallel from one snapshot race to the ledger.

use std::sync::Arc;

use agent_core::{AgentId, MessageWitness, SecurityCode, SenderKey};
use runtime::{
    ExecutionContext, InMemoryAgentStore, LedgerError, MessageLedger, ProverPool,
};
use zk::StubProver;

fn witness(number: u64) -> MessageWitness {
    MessageWitness::new(number, "Hello, World", AgentId(1), SecurityCode::new('1', '2'))
        .expect("fits")
}

#[tokio::test]
async fn second_proof_from_same_snapshot_is_stale() {
    let prover = Arc::new(StubProver::default());
    let mut ledger = MessageLedger::new(Arc::new(InMemoryAgentStore::new()), prover.clone());
    ledger.populate_agents().expect("populate");

    let pool = ProverPool::new(prover, 4);
    let claim = ledger.claim_for(AgentId(1)).expect("claim");
    let (first, second) = tokio::join!(
        pool.prove(claim, witness(5)),
        pool.prove(claim, witness(6)),
    );
    let (first, second) = (first.expect("prove"), second.expect("prove"));

    let sender = SenderKey::from_seed("operator");
    let accepted = ledger
        .submit_message(&ExecutionContext::new(1, sender, 0), &first)
        .expect("accepted");
    assert_eq!(accepted.last_message_number, 1);

    let error = ledger
        .submit_message(&ExecutionContext::new(1, sender, 1), &second)
        .expect_err("stale");
    assert!(matches!(
        error,
        LedgerError::StaleClaim {
            agent: AgentId(1),
            claimed: 0,
            current: 1
        }
    ));
    assert!(error.severity().is_soft());
    assert_eq!(
        ledger
            .agent_state(AgentId(1))
            .expect("read")
            .expect("seeded")
            .last_message_number,
        1
    );
}

#[tokio::test]
async fn pool_reports_metrics_across_tasks() {
    let prover = Arc::new(StubProver::default());
    let mut ledger = MessageLedger::new(Arc::new(InMemoryAgentStore::new()), prover.clone());
    ledger.populate_agents().expect("populate");
    let claim = ledger.claim_for(AgentId(1)).expect("claim");

    let pool = ProverPool::new(prover, 2);
    let mut tasks = Vec::new();
    for number in 1..=6 {
        let pool = pool.clone();
        tasks.push(tokio::spawn(async move { pool.prove(claim, witness(number)).await }));
    }
    for task in tasks {
        task.await.expect("join").expect("prove");
    }

    let metrics = pool.metrics().snapshot();
    assert_eq!(metrics.generated, 6);
    assert_eq!(metrics.failed, 0);
    assert_eq!(metrics.in_flight, 0);
    assert!(metrics.peak_in_flight >= 1);
}
