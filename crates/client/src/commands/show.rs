//! Read current or recorded agent state

use agent_core::AgentId;
use anyhow::{Result, bail};
use clap::Parser;

use crate::GlobalArgs;

#[derive(Debug, Parser)]
pub struct Show {
    /// Agent to display
    #[arg(long)]
    agent: u64,

    /// Show the state recorded at this block height
    #[arg(long, conflicts_with = "history")]
    block: Option<u64>,

    /// Show every recorded state in block order
    #[arg(long)]
    history: bool,
}

impl Show {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let setup = global.build()?;
        let ledger = setup.chain.ledger();
        let agent_id = AgentId(self.agent);

        if self.history {
            return super::print_json(&ledger.agent_history(agent_id)?);
        }

        if let Some(height) = self.block {
            return match ledger.agent_state_at_block(agent_id, height)? {
                Some(entry) => super::print_json(&entry),
                None => bail!("No state recorded for agent {agent_id} at block {height}"),
            };
        }

        match ledger.agent_state(agent_id)? {
            Some(state) => super::print_json(&state),
            None => bail!("Agent does not exist: {agent_id}"),
        }
    }
}
