//! Runtime configuration structures and loaders.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use agent_core::{AgentId, CoreError, SecurityCode};
use zk::ProofBackend;

/// Secret an agent is registered with at population time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentSeed {
    pub agent_id: AgentId,
    pub security_code: SecurityCode,
}

impl AgentSeed {
    pub const fn new(agent_id: AgentId, security_code: SecurityCode) -> Self {
        Self {
            agent_id,
            security_code,
        }
    }
}

/// Agents registered by `populate_agents` unless configured otherwise.
pub fn default_seeds() -> Vec<AgentSeed> {
    vec![
        AgentSeed::new(AgentId(1), SecurityCode::new('1', '2')),
        AgentSeed::new(AgentId(2), SecurityCode::new('5', '6')),
    ]
}

/// Parses `id:code`, e.g. `1:12`.
impl FromStr for AgentSeed {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, code) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidSeed(s.to_string()))?;
        let agent_id = id
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSeed(s.to_string()))?;
        let security_code = code.parse::<SecurityCode>()?;
        Ok(Self::new(AgentId(agent_id), security_code))
    }
}

/// Parses a comma-separated seed list; blank entries are skipped.
pub fn parse_seed_list(s: &str) -> Result<Vec<AgentSeed>, ConfigError> {
    s.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid agent seed {0:?}: expected `id:code`")]
    InvalidSeed(String),

    #[error(transparent)]
    SecurityCode(#[from] CoreError),

    #[error("unknown proof backend {0:?}")]
    UnknownBackend(String),
}

/// Configuration required to assemble a ledger.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub backend: ProofBackend,
    /// File store directory; `None` keeps state in memory.
    pub data_dir: Option<PathBuf>,
    pub prover_workers: usize,
    pub seeds: Vec<AgentSeed>,
    pub attestation_seed: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend: ProofBackend::Stub,
            data_dir: None,
            prover_workers: 2,
            seeds: default_seeds(),
            attestation_seed: "agent-ledger-dev".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AGENT_LEDGER_BACKEND` - `stub` or `arkworks` (default: stub)
    /// - `AGENT_LEDGER_DATA_DIR` - File store directory (default: in-memory)
    /// - `AGENT_LEDGER_PROVER_WORKERS` - Parallel proof workers (default: 2)
    /// - `AGENT_LEDGER_SEED_AGENTS` - Seed list `id:code,...` (default: `1:12,2:56`)
    /// - `AGENT_LEDGER_ATTESTATION_SEED` - Stub attestation key seed
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(backend) = env::var("AGENT_LEDGER_BACKEND") {
            config.backend = backend
                .trim()
                .to_ascii_lowercase()
                .parse()
                .map_err(|_| ConfigError::UnknownBackend(backend))?;
        }

        config.data_dir = env::var("AGENT_LEDGER_DATA_DIR").ok().map(PathBuf::from);

        if let Some(workers) = read_env::<usize>("AGENT_LEDGER_PROVER_WORKERS") {
            config.prover_workers = workers.max(1);
        }

        if let Ok(seeds) = env::var("AGENT_LEDGER_SEED_AGENTS") {
            config.seeds = parse_seed_list(&seeds)?;
        }

        if let Ok(seed) = env::var("AGENT_LEDGER_ATTESTATION_SEED") {
            config.attestation_seed = seed;
        }

        Ok(config)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seed_entries() {
        let seed: AgentSeed = "7:ab".parse().expect("valid");
        assert_eq!(seed.agent_id, AgentId(7));
        assert_eq!(seed.security_code, SecurityCode::new('a', 'b'));
    }

    #[test]
    fn seed_list_matches_defaults() {
        assert_eq!(parse_seed_list("1:12, 2:56,").expect("valid"), default_seeds());
    }

    #[test]
    fn rejects_malformed_seeds() {
        assert!(matches!(
            "12".parse::<AgentSeed>(),
            Err(ConfigError::InvalidSeed(_))
        ));
        assert!(matches!(
            "x:12".parse::<AgentSeed>(),
            Err(ConfigError::InvalidSeed(_))
        ));
        assert!(matches!(
            "1:123".parse::<AgentSeed>(),
            Err(ConfigError::SecurityCode(CoreError::InvalidSecurityCode(3)))
        ));
    }

    #[test]
    fn defaults_use_stub_backend() {
        let config = RuntimeConfig::default();
        assert_eq!(config.backend, ProofBackend::Stub);
        assert_eq!(config.prover_workers, 2);
        assert!(config.data_dir.is_none());
    }
}
