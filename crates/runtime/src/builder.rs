//! Assembles the store, prover, ledger and chain from a [`RuntimeConfig`].
use std::sync::Arc;

use tracing::info;
use zk::{ProofBackend, Prover};

use crate::chain::LocalChain;
use crate::config::RuntimeConfig;
use crate::error::Result;
use crate::ledger::MessageLedger;
use crate::repository::{AgentStore, FileAgentStore, InMemoryAgentStore};
use crate::workers::ProverPool;

/// Builder that wires one prover into both the ledger's verifier and the
/// proving pool.
pub struct LedgerBuilder {
    config: RuntimeConfig,
    store: Option<Arc<dyn AgentStore>>,
    prover: Option<Arc<dyn Prover>>,
}

impl LedgerBuilder {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            store: None,
            prover: None,
        }
    }

    /// Use `store` instead of the one `config.data_dir` selects.
    pub fn store(mut self, store: impl AgentStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use `prover` instead of constructing one for `config.backend`.
    pub fn prover(mut self, prover: impl Prover + 'static) -> Self {
        self.prover = Some(Arc::new(prover));
        self
    }

    pub fn build(self) -> Result<LedgerSetup> {
        let store = match self.store {
            Some(store) => store,
            None => open_store(&self.config)?,
        };
        let prover = match self.prover {
            Some(prover) => prover,
            None => build_prover(&self.config)?,
        };

        let ledger = MessageLedger::new(store, Arc::clone(&prover))
            .with_seeds(self.config.seeds.clone());
        let chain = LocalChain::new(ledger)?;
        let provers = ProverPool::new(prover, self.config.prover_workers);

        info!(
            backend = %provers.prover().backend(),
            next_height = chain.next_height(),
            workers = self.config.prover_workers,
            "ledger ready"
        );

        Ok(LedgerSetup {
            config: self.config,
            chain,
            provers,
        })
    }
}

pub struct LedgerSetup {
    pub config: RuntimeConfig,
    pub chain: LocalChain,
    pub provers: ProverPool,
}

fn open_store(config: &RuntimeConfig) -> Result<Arc<dyn AgentStore>> {
    match &config.data_dir {
        Some(dir) => {
            let store = FileAgentStore::open(dir)?;
            info!(path = %store.path().display(), "using file agent store");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryAgentStore::new())),
    }
}

fn build_prover(config: &RuntimeConfig) -> Result<Arc<dyn Prover>> {
    match config.backend {
        ProofBackend::Stub => stub_prover(config),
        ProofBackend::Arkworks => arkworks_prover(config),
    }
}

#[cfg(feature = "stub")]
fn stub_prover(config: &RuntimeConfig) -> Result<Arc<dyn Prover>> {
    Ok(Arc::new(zk::StubProver::from_seed(&config.attestation_seed)))
}

#[cfg(not(feature = "stub"))]
fn stub_prover(_config: &RuntimeConfig) -> Result<Arc<dyn Prover>> {
    Err(crate::LedgerError::BackendUnavailable(ProofBackend::Stub))
}

/// Groth16 keys are generated once per data directory and reused after.
/// Without a data directory every run performs its own setup.
#[cfg(feature = "arkworks")]
fn arkworks_prover(config: &RuntimeConfig) -> Result<Arc<dyn Prover>> {
    use std::fs;
    use zk::ArkworksProver;
    use zk::circuit::Groth16Keys;

    use crate::repository::RepositoryError;

    const GROTH16_KEYS_FILE: &str = "groth16_keys.bin";

    let Some(dir) = &config.data_dir else {
        return Ok(Arc::new(ArkworksProver::new()?));
    };

    let path = dir.join(GROTH16_KEYS_FILE);
    if path.exists() {
        let bytes = fs::read(&path).map_err(RepositoryError::from)?;
        let keys = Groth16Keys::from_bytes(&bytes)?;
        info!(path = %path.display(), "loaded Groth16 keys");
        return Ok(Arc::new(ArkworksProver::from_keys(keys)));
    }

    let prover = ArkworksProver::new()?;
    fs::create_dir_all(dir).map_err(RepositoryError::from)?;
    fs::write(&path, prover.keys().to_bytes()?).map_err(RepositoryError::from)?;
    info!(path = %path.display(), "saved Groth16 keys");
    Ok(Arc::new(prover))
}

#[cfg(not(feature = "arkworks"))]
fn arkworks_prover(_config: &RuntimeConfig) -> Result<Arc<dyn Prover>> {
    Err(crate::LedgerError::BackendUnavailable(ProofBackend::Arkworks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentId;
    use zk::StubProver;

    fn builder(config: RuntimeConfig) -> LedgerBuilder {
        let prover = StubProver::from_seed(&config.attestation_seed);
        LedgerBuilder::new(config).prover(prover)
    }

    #[test]
    fn in_memory_setup_populates_seeds() {
        let setup = builder(RuntimeConfig::default()).build().expect("build");
        let mut chain = setup.chain;
        assert_eq!(chain.next_height(), 0);

        let ids = chain
            .ledger()
            .store()
            .agent_ids()
            .expect("ids");
        assert!(ids.is_empty());

        let sender = agent_core::SenderKey::from_seed("alice");
        chain.submit(sender, crate::RuntimeCall::PopulateAgents);
        let block = chain.produce_block();
        assert!(block.receipts[0].is_success());
        assert!(chain.ledger().agent_state(AgentId(2)).expect("read").is_some());
    }

    #[test]
    fn file_setup_resumes_block_height() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = RuntimeConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..RuntimeConfig::default()
        };

        let setup = builder(config.clone()).build().expect("build");
        let mut chain = setup.chain;
        let sender = agent_core::SenderKey::from_seed("alice");
        chain.submit(sender, crate::RuntimeCall::PopulateAgents);
        chain.produce_block();

        let claim = chain.ledger().claim_for(AgentId(1)).expect("claim");
        let witness = agent_core::MessageWitness::new(
            4,
            "Hello, World",
            AgentId(1),
            agent_core::SecurityCode::new('1', '2'),
        )
        .expect("fits");
        let proof = setup.provers.prover().prove(&claim, &witness).expect("prove");
        chain.submit(sender, crate::RuntimeCall::SubmitMessage(Box::new(proof)));
        let block = chain.produce_block();
        assert_eq!(block.height, 1);
        assert!(block.receipts[0].is_success());

        let reopened = builder(config).build().expect("reopen");
        assert_eq!(reopened.chain.next_height(), 2);
        assert_eq!(
            reopened
                .chain
                .ledger()
                .agent_state(AgentId(1))
                .expect("read")
                .expect("persisted")
                .last_message_number,
            1
        );
    }

    #[cfg(not(feature = "arkworks"))]
    #[test]
    fn uncompiled_backend_is_reported() {
        let config = RuntimeConfig {
            backend: ProofBackend::Arkworks,
            ..RuntimeConfig::default()
        };
        assert!(matches!(
            LedgerBuilder::new(config).build(),
            Err(crate::LedgerError::BackendUnavailable(ProofBackend::Arkworks))
        ));
    }
}
