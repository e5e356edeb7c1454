//! Watch command: refresh every topic on an interval until Ctrl-C.

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use tracing::warn;

use super::refresh::print_report;
use crate::config::Config;
use crate::context::open_service;

pub async fn execute(interval: Option<u64>, config: &Config) -> Result<()> {
    let period = config.watch_period(interval)?;
    let mut service = open_service(config)?;

    println!(
        "{} Watching {} topic(s) every {}s. Press Ctrl-C to stop.",
        "●".green(),
        service.workspace().tree().len(),
        period.as_secs()
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    service
        .watch(period, shutdown, |report| {
            println!();
            println!(
                "{}",
                format!("Pass at {}", Local::now().format("%Y-%m-%d %H:%M:%S")).cyan()
            );
            if report.total() == 0 {
                println!("  {}", "No topics yet.".yellow());
            } else {
                print_report(report);
            }
        })
        .await;

    println!("{}", "Stopped.".yellow());
    Ok(())
}
