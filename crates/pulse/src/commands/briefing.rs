//! Briefing command: generate or show the cross-topic briefing.

use anyhow::Result;
use colored::Colorize;
use pulse_core::TopicTree;
use pulse_core::types::Briefing;

use crate::cli::{BriefingAction, BriefingCommand};
use crate::config::Config;
use crate::context::{open_service, open_workspace};
use crate::render::{html_to_text, spinner, timestamp};

pub async fn execute(cmd: BriefingCommand, config: &Config) -> Result<()> {
    match cmd.action {
        BriefingAction::Generate => generate(config).await,
        BriefingAction::Show { json, raw } => show(config, json, raw),
    }
}

async fn generate(config: &Config) -> Result<()> {
    let mut service = open_service(config)?;

    let bar = spinner(format!(
        "Analysing {} topic(s)...",
        service.workspace().tree().len()
    ));
    let result = service.generate_briefing().await;
    bar.finish_and_clear();
    let briefing = result?;

    println!("{} Briefing generated", "✓".green());
    print_briefing(&briefing, service.workspace().tree(), false);
    Ok(())
}

fn show(config: &Config, json: bool, raw: bool) -> Result<()> {
    let workspace = open_workspace(config)?;

    let Some(briefing) = workspace.briefing() else {
        println!(
            "{}",
            "No briefing yet. Run `pulse briefing generate`.".yellow()
        );
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(briefing)?);
        return Ok(());
    }

    print_briefing(briefing, workspace.tree(), raw);
    Ok(())
}

fn print_briefing(briefing: &Briefing, tree: &TopicTree, raw: bool) {
    println!(
        "{} {}",
        "Global briefing".cyan().bold(),
        format!(
            "({}, {} topic(s))",
            timestamp(briefing.timestamp),
            briefing.topic_ids.len()
        )
        .dimmed()
    );
    println!("{}", "─".repeat(60));
    if raw {
        println!("{}", briefing.content);
    } else {
        println!("{}", html_to_text(&briefing.content));
    }

    let covered = covered_titles(tree, briefing);
    if !covered.is_empty() {
        println!("{}", "─".repeat(60));
        println!("{} {}", "Covers:".dimmed(), covered.join(", "));
    }
}

/// Titles of the root topics the briefing covered that still exist.
fn covered_titles<'a>(tree: &'a TopicTree, briefing: &Briefing) -> Vec<&'a str> {
    tree.roots()
        .into_iter()
        .filter(|t| briefing.topic_ids.contains(&t.id))
        .map(|t| t.title.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::types::NewTopic;

    fn add(tree: &mut TopicTree, title: &str, parent: Option<&str>) -> String {
        tree.add_topic(NewTopic {
            title: title.into(),
            parent_id: parent.map(str::to_string),
            ..NewTopic::default()
        })
        .unwrap()
        .id
    }

    #[test]
    fn test_covered_titles_lists_live_roots() {
        let mut tree = TopicTree::default();
        let ai = add(&mut tree, "AI", None);
        let chips = add(&mut tree, "Chips", Some(&ai));
        let energy = add(&mut tree, "Energy", None);
        add(&mut tree, "Added later", None);

        let briefing = Briefing {
            id: "b".into(),
            timestamp: 1,
            content: String::new(),
            topic_ids: vec![ai, chips, energy, "deleted".into()],
        };

        assert_eq!(covered_titles(&tree, &briefing), vec!["AI", "Energy"]);
    }
}
