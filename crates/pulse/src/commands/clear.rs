//! Clear command: delete every topic and the stored briefing.

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use crate::config::Config;
use crate::context::open_workspace;

pub fn execute(yes: bool, config: &Config) -> Result<()> {
    let mut workspace = open_workspace(config)?;
    let count = workspace.tree().len();

    if count == 0 && workspace.briefing().is_none() {
        println!("{}", "Nothing to clear.".yellow());
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} topic(s), their events and the briefing?",
                count
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    workspace.clear_all()?;
    println!("{} Cleared {} topic(s)", "✓".green(), count);
    Ok(())
}
