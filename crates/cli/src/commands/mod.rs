//! Command handlers for the Clearance CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod ingest;
pub mod roles;
pub mod status;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use roles::RolesCommand;
pub use status::StatusCommand;

use clearance_core::AppResult;

/// Pretty-print a JSON value on stdout.
pub(crate) fn print_json(value: &serde_json::Value) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
