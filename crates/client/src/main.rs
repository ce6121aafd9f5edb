//! Agent message ledger client.
//!
//! Command-line entry point for seeding agents, checking and submitting
//! messages, and inspecting recorded state. Configuration comes from the
//! environment (`.env` is loaded first) and is overridden by the flags below.
//!
//! # Examples
//!
//! ```bash
//! agent-client populate
//! agent-client submit --agent 1 --number 5 --code 12 --text "Hello, World"
//! agent-client show --agent 1 --history
//! agent-client --backend arkworks demo
//! ```
//!
//! Each invocation produces its own blocks; state persists between runs in
//! the data directory unless `--memory` is given.

mod commands;
mod dirs;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use runtime::{LedgerBuilder, LedgerSetup, RuntimeConfig};
use zk::ProofBackend;

use commands::{Check, Demo, Populate, Show, Submit};

/// Agent message ledger client
#[derive(Parser)]
#[command(name = "agent-client")]
#[command(about = "Submit and inspect proven agent messages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// Proving backend (overrides AGENT_LEDGER_BACKEND)
    #[arg(long, global = true, value_parser = parse_backend)]
    backend: Option<ProofBackend>,

    /// Store directory (overrides AGENT_LEDGER_DATA_DIR)
    #[arg(long, global = true, conflicts_with = "memory")]
    data_dir: Option<PathBuf>,

    /// Keep state in memory for this run only
    #[arg(long, global = true)]
    memory: bool,

    /// Seed the sender key of submitted transactions is derived from
    #[arg(long, global = true, default_value = "local-operator")]
    sender: String,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl GlobalArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = RuntimeConfig::from_env().context("Invalid AGENT_LEDGER_* setting")?;

        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if self.memory {
            config.data_dir = None;
        } else if config.data_dir.is_none() {
            config.data_dir = Some(dirs::data_dir());
        }

        Ok(config)
    }

    pub fn build(&self) -> Result<LedgerSetup> {
        let config = self.runtime_config()?;
        tracing::debug!(?config, "building ledger");
        LedgerBuilder::new(config)
            .build()
            .context("Failed to assemble ledger")
    }

    pub fn sender(&self) -> agent_core::SenderKey {
        agent_core::SenderKey::from_seed(&self.sender)
    }
}

fn parse_backend(s: &str) -> std::result::Result<ProofBackend, String> {
    s.to_ascii_lowercase()
        .parse()
        .map_err(|_| format!("unknown backend {s:?} (expected stub or arkworks)"))
}

#[derive(Parser)]
enum Command {
    /// Register the configured seed agents
    Populate(Populate),

    /// Check whether a message would be accepted, without proving
    Check(Check),

    /// Prove a message and submit it in a new block
    Submit(Submit),

    /// Show an agent's current or recorded state
    Show(Show),

    /// Run a scripted walkthrough against an in-memory ledger
    Demo(Demo),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = logging::setup_logging(cli.global.verbose)?;

    match cli.command {
        Command::Populate(cmd) => cmd.execute(&cli.global),
        Command::Check(cmd) => cmd.execute(&cli.global),
        Command::Submit(cmd) => cmd.execute(&cli.global).await,
        Command::Show(cmd) => cmd.execute(&cli.global),
        Command::Demo(cmd) => cmd.execute(&cli.global).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_submit_with_global_flags() {
        let cli = Cli::try_parse_from([
            "agent-client",
            "--memory",
            "--backend",
            "stub",
            "submit",
            "--agent",
            "1",
            "--number",
            "5",
            "--code",
            "12",
            "--text",
            "Hello, World",
        ])
        .expect("parse");

        assert!(cli.global.memory);
        assert_eq!(cli.global.backend, Some(ProofBackend::Stub));
        assert!(matches!(cli.command, Command::Submit(_)));
    }

    #[test]
    fn memory_flag_disables_data_dir() {
        let cli = Cli::try_parse_from(["agent-client", "--memory", "populate"]).expect("parse");
        let config = cli.global.runtime_config().expect("config");
        assert!(config.data_dir.is_none());
    }
}
