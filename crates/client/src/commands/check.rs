//! Direct validity check without proof generation

use agent_core::{AgentId, SecurityCode};
use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use crate::GlobalArgs;

#[derive(Debug, Parser)]
pub struct Check {
    /// Agent to check against
    #[arg(long)]
    agent: u64,

    /// Message number the message would carry
    #[arg(long)]
    number: u64,

    /// Two-symbol security code
    #[arg(long)]
    code: SecurityCode,
}

#[derive(Serialize)]
struct CheckReport {
    agent_id: AgentId,
    message_number: u64,
    valid: bool,
    reason: Option<String>,
}

impl Check {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let setup = global.build()?;
        let agent_id = AgentId(self.agent);

        let outcome = setup
            .chain
            .ledger()
            .is_message_valid(agent_id, self.number, &self.code);

        let report = match outcome {
            Ok(valid) => CheckReport {
                agent_id,
                message_number: self.number,
                valid,
                reason: None,
            },
            Err(error) if error.severity().is_soft() => CheckReport {
                agent_id,
                message_number: self.number,
                valid: false,
                reason: Some(error.to_string()),
            },
            Err(error) => return Err(error.into()),
        };

        super::print_json(&report)
    }
}
