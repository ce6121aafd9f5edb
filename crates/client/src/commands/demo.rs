//! Scripted walkthrough of the message protocol
//!
//! Runs against a fresh in-memory ledger with the configured backend and
//! seeds, printing one line per step.

use agent_core::{AgentId, MessageWitness, SecurityCode};
use anyhow::{Context, Result, ensure};
use clap::Parser;
use runtime::{Block, LedgerBuilder, LocalChain, ProverPool, RuntimeCall};
use zk::MessageProof;

use crate::GlobalArgs;

const AGENT: AgentId = AgentId(1);

#[derive(Debug, Parser)]
pub struct Demo {
    /// Security code agent 1 was seeded with
    #[arg(long, default_value = "12")]
    code: SecurityCode,
}

impl Demo {
    pub async fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let mut config = global.runtime_config()?;
        config.data_dir = None;
        let setup = LedgerBuilder::new(config).build()?;
        let (mut chain, provers) = (setup.chain, setup.provers);
        let sender = global.sender();

        chain.submit(sender, RuntimeCall::PopulateAgents);
        let block = chain.produce_block();
        ensure!(block.receipts[0].is_success(), "population failed");
        println!("block {}: seeded agents", block.height);

        let valid = chain.ledger().is_message_valid(AGENT, 5, &self.code)?;
        println!("check  agent {AGENT} #5: valid = {valid}");

        for number in [5, 6] {
            let proof = prove(&chain, &provers, number, "Hello, World", self.code).await?;
            let block = submit(&mut chain, sender, proof);
            report(&block, &chain)?;
        }

        let wrong = SecurityCode::new('9', '9');
        match prove(&chain, &provers, 9, "Hello, World", wrong).await {
            Ok(_) => println!("prove  #9 with a wrong code unexpectedly succeeded"),
            Err(error) => println!("prove  #9 with a wrong code: {error:#}"),
        }

        match MessageWitness::new(10, "Hello, World!!!!", AGENT, self.code) {
            Ok(_) => println!("witness with 16 symbols unexpectedly fit"),
            Err(error) => println!("witness with 16 symbols: {error}"),
        }

        let short = prove(&chain, &provers, 10, "Hello", self.code).await?;
        println!("prove  #10 \"Hello\": is_valid = {}", short.public_output.is_valid);
        let block = submit(&mut chain, sender, short);
        report(&block, &chain)?;

        let (first, second) = tokio::join!(
            prove(&chain, &provers, 11, "Hello, World", self.code),
            prove(&chain, &provers, 12, "Hello, World", self.code),
        );
        chain.submit(sender, RuntimeCall::SubmitMessage(Box::new(first?)));
        chain.submit(sender, RuntimeCall::SubmitMessage(Box::new(second?)));
        let block = chain.produce_block();
        println!("block {}: two proofs from one snapshot", block.height);
        report(&block, &chain)?;

        let metrics = provers.metrics().snapshot();
        println!(
            "proofs generated = {}, failed = {}, avg = {:?}",
            metrics.generated, metrics.failed, metrics.avg_proving_time
        );
        Ok(())
    }
}

async fn prove(
    chain: &LocalChain,
    provers: &ProverPool,
    number: u64,
    text: &str,
    code: SecurityCode,
) -> Result<MessageProof> {
    let claim = chain.ledger().claim_for(AGENT)?;
    let witness = MessageWitness::new(number, text, AGENT, code)?;
    provers
        .prove(claim, witness)
        .await
        .with_context(|| format!("proof for message #{number}"))
}

fn submit(chain: &mut LocalChain, sender: agent_core::SenderKey, proof: MessageProof) -> Block {
    chain.submit(sender, RuntimeCall::SubmitMessage(Box::new(proof)));
    chain.produce_block()
}

fn report(block: &Block, chain: &LocalChain) -> Result<()> {
    let last = chain
        .ledger()
        .agent_state(AGENT)?
        .map(|state| state.last_message_number)
        .context("agent disappeared")?;

    for receipt in &block.receipts {
        match &receipt.error {
            None => println!(
                "block {}: nonce {} accepted, last_message_number = {last}",
                block.height, receipt.nonce
            ),
            Some(error) => println!(
                "block {}: nonce {} {}: {error}, last_message_number = {last}",
                block.height, receipt.nonce, receipt.status
            ),
        }
    }
    Ok(())
}
