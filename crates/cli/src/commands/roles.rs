//! Roles command handler.

use clap::Args;
use clearance_core::{config::AppConfig, AppResult};
use clearance_knowledge::RoleAccessTable;

/// Show the role-access table
#[derive(Args, Debug)]
pub struct RolesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RolesCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing roles command");

        let access = RoleAccessTable::load_or_builtin(&config.workspace)?;

        if self.json {
            return super::print_json(&serde_json::to_value(&access)?);
        }

        println!("Access table version {}", access.version());
        println!();
        for (role, departments) in access.roles() {
            let departments: Vec<&str> = departments.iter().map(|d| d.as_str()).collect();
            println!("{:<14} {}", role.as_str(), departments.join(", "));
        }

        Ok(())
    }
}
