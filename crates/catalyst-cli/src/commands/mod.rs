// Module exports for CLI subcommands.
//
// Each module handles one subcommand; main.rs parses arguments, builds the
// gateway and dispatches here.

pub mod inspect;
pub mod routes;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use catalyst_gateway::DispatchEntry;

/// Output format shared by every subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Human-readable handler name for a dispatch entry.
pub fn describe_entry(entry: &DispatchEntry) -> String {
    match entry {
        DispatchEntry::Features { schema, query } => format!("{} + {}", schema, query),
        DispatchEntry::Collections => "collections".to_string(),
    }
}
