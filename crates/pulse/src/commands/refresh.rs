//! Refresh command: fetch the latest developments for topics.

use anyhow::{Result, bail};
use colored::Colorize;
use pulse_core::service::RefreshReport;

use crate::config::Config;
use crate::context::{open_service, resolve_id};
use crate::render::{html_to_text, spinner};

pub async fn execute(id: Option<String>, all: bool, config: &Config) -> Result<()> {
    let mut service = open_service(config)?;

    if all {
        if service.workspace().tree().is_empty() {
            println!("{}", "No topics to refresh.".yellow());
            return Ok(());
        }
        let bar = spinner(format!(
            "Refreshing {} topic(s)...",
            service.workspace().tree().len()
        ));
        let report = service.refresh_all().await;
        bar.finish_and_clear();
        print_report(&report);
        if !report.failed.is_empty() && report.refreshed.is_empty() {
            bail!("Every refresh failed");
        }
        return Ok(());
    }

    let Some(reference) = id else {
        bail!("Pass a topic ID or --all");
    };
    let topic_id = resolve_id(service.workspace(), &reference)?;
    let title = service
        .workspace()
        .tree()
        .get(&topic_id)
        .map(|t| t.title.clone())
        .unwrap_or_default();

    let bar = spinner(format!("Searching for news on {}...", title));
    let result = service.refresh_topic(&topic_id).await;
    bar.finish_and_clear();
    let event = result?;

    println!("{} New event for {}", "✓".green(), title.cyan());
    println!();
    println!("{}", html_to_text(&event.content));
    if !event.source_urls.is_empty() {
        println!();
        println!("{}", "Sources:".dimmed());
        for url in &event.source_urls {
            println!("  {}", url.blue());
        }
    }
    Ok(())
}

/// Print one line per topic of a refresh pass.
pub fn print_report(report: &RefreshReport) {
    for done in &report.refreshed {
        println!(
            "  {} {} {}",
            "✓".green(),
            done.title,
            format!("({} source(s))", done.event.source_urls.len()).dimmed()
        );
    }
    for failed in &report.failed {
        println!(
            "  {} {} {}",
            "✗".red(),
            failed.title,
            failed.error.to_string().red()
        );
    }
    println!(
        "{} refreshed, {} failed",
        report.refreshed.len().to_string().green(),
        report.failed.len().to_string().red()
    );
}
