use anyhow::{Context, Result};
use serde::Serialize;

pub mod display;
pub mod init;
pub mod message;

/// Print `value` to stdout as pretty JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Could not serialize output")?;
    println!("{json}");
    Ok(())
}
