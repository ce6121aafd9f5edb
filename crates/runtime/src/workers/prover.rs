//! Parallel proof generation.
//!
//! Proving is pure and CPU bound, so requests run on tokio's blocking pool
//! with a semaphore bounding how many run at once. Each request works on its
//! own claim snapshot; nothing here touches the store.

use std::sync::Arc;
use std::time::Instant;

use agent_core::{MessageWitness, ValidatorClaim};
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use zk::{MessageProof, Prover};

use crate::error::{LedgerError, Result};
use crate::workers::ProofMetrics;

#[derive(Clone)]
pub struct ProverPool {
    prover: Arc<dyn Prover>,
    permits: Arc<Semaphore>,
    metrics: Arc<ProofMetrics>,
}

impl ProverPool {
    /// Pool running at most `workers` proofs concurrently (minimum 1).
    pub fn new(prover: Arc<dyn Prover>, workers: usize) -> Self {
        Self {
            prover,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            metrics: Arc::new(ProofMetrics::new()),
        }
    }

    pub fn prover(&self) -> &Arc<dyn Prover> {
        &self.prover
    }

    /// Returns a clone of the metrics Arc for external querying.
    pub fn metrics(&self) -> Arc<ProofMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Proves `witness` against `claim` on a blocking worker.
    pub async fn prove(
        &self,
        claim: ValidatorClaim,
        witness: MessageWitness,
    ) -> Result<MessageProof> {
        self.metrics.request_started();
        let result = self.run(claim, witness).await;
        self.metrics.request_finished();

        if result.is_err() {
            self.metrics.record_failure();
        }
        result
    }

    async fn run(&self, claim: ValidatorClaim, witness: MessageWitness) -> Result<MessageProof> {
        let _permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| LedgerError::Worker(e.to_string()))?;

        let prover = Arc::clone(&self.prover);
        let started = Instant::now();
        let outcome = tokio::task::spawn_blocking(move || prover.prove(&claim, &witness))
            .await
            .map_err(|e| LedgerError::Worker(e.to_string()))?;

        match outcome {
            Ok(proof) => {
                let elapsed = started.elapsed();
                self.metrics.record_success(elapsed);
                debug!(
                    backend = %proof.backend(),
                    agent = %proof.public_input.agent_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "proof ready"
                );
                Ok(proof)
            }
            Err(error) => {
                warn!(agent = %claim.agent_id, %error, "proof generation failed");
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{AgentId, AgentState, SecurityCode, commit};
    use zk::{ProofError, StubProver};

    fn claim() -> ValidatorClaim {
        let hash = commit(&SecurityCode::new('1', '2')).expect("commit");
        ValidatorClaim::new(AgentState::seeded(AgentId(1), hash))
    }

    fn witness(secret: SecurityCode) -> MessageWitness {
        MessageWitness::new(3, "Hello, World", AgentId(1), secret).expect("fits")
    }

    #[tokio::test]
    async fn proofs_from_one_snapshot_run_in_parallel() {
        let pool = ProverPool::new(Arc::new(StubProver::default()), 2);
        let (a, b) = tokio::join!(
            pool.prove(claim(), witness(SecurityCode::new('1', '2'))),
            pool.prove(claim(), witness(SecurityCode::new('1', '2'))),
        );

        assert!(a.is_ok() && b.is_ok());
        let metrics = pool.metrics().snapshot();
        assert_eq!(metrics.generated, 2);
        assert_eq!(metrics.in_flight, 0);
    }

    #[tokio::test]
    async fn rejected_witness_counts_as_failure() {
        let pool = ProverPool::new(Arc::new(StubProver::default()), 1);
        let error = pool
            .prove(claim(), witness(SecurityCode::new('9', '9')))
            .await
            .expect_err("wrong secret");

        assert!(matches!(
            error,
            LedgerError::Proof(ProofError::Rejected(_))
        ));
        assert!(error.severity().is_soft());
        assert_eq!(pool.metrics().failed(), 1);
    }
}
