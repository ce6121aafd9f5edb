//! Prove a message and submit it
//!
//! The proof is built against the agent's current state on a prover worker,
//! then submitted as a `SubmitMessage` transaction in a new block. Proofs can
//! be written to a JSON file with `--save-proof` and submitted later with
//! `--proof`.

use std::path::{Path, PathBuf};

use agent_core::{AgentId, MessageWitness, SecurityCode};
use anyhow::{Context, Result};
use clap::Parser;
use runtime::{LedgerSetup, RuntimeCall};
use zk::MessageProof;

use crate::GlobalArgs;

#[derive(Debug, Parser)]
pub struct Submit {
    /// Agent sending the message
    #[arg(long, required_unless_present = "proof")]
    agent: Option<u64>,

    /// Message number (must exceed the agent's last accepted number)
    #[arg(long, required_unless_present = "proof")]
    number: Option<u64>,

    /// Two-symbol security code
    #[arg(long, required_unless_present = "proof")]
    code: Option<SecurityCode>,

    /// Message payload (at most 12 symbols)
    #[arg(long, required_unless_present = "proof")]
    text: Option<String>,

    /// Write the generated proof to this file as JSON
    #[arg(long)]
    save_proof: Option<PathBuf>,

    /// Submit a previously saved proof instead of proving
    #[arg(long, conflicts_with_all = ["agent", "number", "code", "text", "save_proof"])]
    proof: Option<PathBuf>,
}

impl Submit {
    pub async fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let setup = global.build()?;

        let proof = match &self.proof {
            Some(path) => load_proof(path)?,
            None => self.prove(&setup).await?,
        };

        if let Some(path) = &self.save_proof {
            let json = serde_json::to_vec_pretty(&proof).context("Failed to encode proof")?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write proof: {}", path.display()))?;
            tracing::info!(path = %path.display(), "proof saved");
        }

        let mut chain = setup.chain;
        chain.submit(global.sender(), RuntimeCall::SubmitMessage(Box::new(proof)));
        let block = chain.produce_block();

        super::print_json(&block)
    }

    async fn prove(&self, setup: &LedgerSetup) -> Result<MessageProof> {
        let (Some(agent), Some(number), Some(code), Some(text)) =
            (self.agent, self.number, self.code, self.text.as_deref())
        else {
            anyhow::bail!("--agent, --number, --code and --text are required without --proof");
        };

        let agent_id = AgentId(agent);
        let claim = setup.chain.ledger().claim_for(agent_id)?;
        let witness = MessageWitness::new(number, text, agent_id, code)?;

        let proof = setup
            .provers
            .prove(claim, witness)
            .await
            .context("Proof generation failed")?;

        let metrics = setup.provers.metrics();
        tracing::info!(
            backend = %proof.backend(),
            is_valid = proof.public_output.is_valid,
            avg_ms = metrics.avg_proving_time().as_millis() as u64,
            "proof generated"
        );
        Ok(proof)
    }
}

fn load_proof(path: &Path) -> Result<MessageProof> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read proof: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to decode proof: {}", path.display()))
}
