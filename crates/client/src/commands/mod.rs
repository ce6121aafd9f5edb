//! Command implementations for the client
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod check;
mod demo;
mod populate;
mod show;
mod submit;

pub use check::Check;
pub use demo::Demo;
pub use populate::Populate;
pub use show::Show;
pub use submit::Submit;

use anyhow::{Context, Result};
use serde::Serialize;

/// Pretty-prints `value` as JSON on stdout.
fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{json}");
    Ok(())
}
