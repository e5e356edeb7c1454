//! Diagnostics command.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use pulse_core::Store;
use pulse_core::store::{LEGACY_TOPICS_KEY, STORE_FILE, StateOrigin, TOPICS_KEY};

use crate::config::Config;

pub fn execute(config: &Config) -> Result<()> {
    println!("{}", "pulse Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    let config_path = Config::config_path();
    if config_path.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check data directory
    print!("  Data directory: ");
    if config.paths.data_dir.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ will be created".yellow());
    }

    // Check store (read-only, never created here)
    print!("  Store: ");
    let store_path = config.paths.data_dir.join(STORE_FILE);
    if store_path.exists() {
        if let Err(issue) = check_store(&store_path) {
            issues.push(issue);
        }
    } else {
        println!("{}", "○ not created yet".yellow());
    }

    // Check API key
    print!("  API key: ");
    if config.api_key().is_some() {
        println!("{}", "✓ configured".green());
    } else {
        println!("{}", "✗ missing".red());
        issues.push("No API key; set ai.api_key, GEMINI_API_KEY or API_KEY");
    }

    println!("  Model: {}", config.ai.model);
    println!("  Answer language: {}", config.prompt.language);

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}

fn check_store(path: &Path) -> std::result::Result<(), &'static str> {
    let store = match Store::open_read_only(path) {
        Ok(store) => store,
        Err(e) => {
            println!("{}", format!("✗ {}", e).red());
            return Err("Store not accessible");
        }
    };

    match store.load_topics() {
        Ok(loaded) => {
            let label = match loaded.origin {
                StateOrigin::Current => format!("✓ {} topic(s) ({})", loaded.topics.len(), TOPICS_KEY),
                StateOrigin::MigratedFromV2 => format!(
                    "✓ {} topic(s) from legacy {} (migrates on next change)",
                    loaded.topics.len(),
                    LEGACY_TOPICS_KEY
                ),
                StateOrigin::Empty => "✓ empty".to_string(),
            };
            println!("{}", label.green());
            Ok(())
        }
        Err(e) => {
            println!("{}", format!("✗ {}", e).red());
            Err("Saved topics could not be read")
        }
    }
}
