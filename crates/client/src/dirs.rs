//! Platform-specific directory utilities

use std::path::PathBuf;

/// Get the platform-specific data directory for the agent ledger
///
/// Follows platform conventions:
/// - macOS: `~/Library/Application Support/agent-ledger`
/// - Linux: `~/.local/share/agent-ledger` (or `$XDG_DATA_HOME/agent-ledger`)
/// - Windows: `%APPDATA%\agent-ledger`
/// - Fallback: `./agent_ledger_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "agent-ledger")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./agent_ledger_data"))
}
