//! Config command: inspect the effective configuration.

use anyhow::Result;

use crate::cli::{ConfigAction, ConfigCommand};
use crate::config::Config;

pub fn execute(cmd: ConfigCommand, config: &Config) -> Result<()> {
    match cmd.action {
        ConfigAction::Show => {
            print!("{}", config.to_display_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }
    }
    Ok(())
}
