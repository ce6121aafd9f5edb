//! Register the configured seed agents

use anyhow::Result;
use clap::Parser;
use runtime::RuntimeCall;

use crate::GlobalArgs;

#[derive(Debug, Parser)]
pub struct Populate {}

impl Populate {
    pub fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let mut chain = global.build()?.chain;
        chain.submit(global.sender(), RuntimeCall::PopulateAgents);
        let block = chain.produce_block();

        super::print_json(&block)
    }
}
