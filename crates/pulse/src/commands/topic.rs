//! Topic command: add, list, show, edit, delete and focus points.

use anyhow::{Result, bail};
use colored::Colorize;
use dialoguer::Confirm;
use pulse_core::types::{NewTopic, Topic, TopicPatch};
use pulse_core::{TopicTree, Workspace};

use crate::cli::{TopicAction, TopicCommand};
use crate::config::Config;
use crate::context::{open_workspace, resolve_id};
use crate::render::{html_to_text, timestamp};

/// Execute topic command.
pub fn execute(cmd: TopicCommand, config: &Config) -> Result<()> {
    let mut workspace = open_workspace(config)?;

    match cmd.action {
        TopicAction::Add {
            title,
            description,
            category,
            parent,
        } => add(&mut workspace, title, description, category, parent),
        TopicAction::List { json } => list(&workspace, json),
        TopicAction::Show { id, json, raw } => show(&workspace, &id, json, raw),
        TopicAction::Edit {
            id,
            title,
            description,
            category,
        } => edit(
            &mut workspace,
            &id,
            TopicPatch {
                title,
                description,
                category,
            },
        ),
        TopicAction::Delete { id, yes } => delete(&mut workspace, &id, yes),
        TopicAction::Focus { parent, text } => focus(&mut workspace, &parent, &text),
    }
}

fn add(
    workspace: &mut Workspace,
    title: String,
    description: String,
    category: Option<String>,
    parent: Option<String>,
) -> Result<()> {
    let parent_id = parent
        .map(|p| resolve_id(workspace, &p))
        .transpose()?;

    let topic = workspace.edit(|tree| {
        tree.add_topic(NewTopic {
            title,
            description,
            category,
            parent_id,
        })
    })?;

    println!("{} Topic added", "✓".green());
    print_summary(workspace.tree(), &topic);
    println!(
        "\n  Run {} to fetch its first update.",
        format!("pulse refresh {}", topic.short_id()).cyan()
    );
    Ok(())
}

fn list(workspace: &Workspace, json: bool) -> Result<()> {
    let tree = workspace.tree();

    if json {
        println!("{}", serde_json::to_string_pretty(tree.topics())?);
        return Ok(());
    }

    if tree.is_empty() {
        println!("{}", "No topics yet. Add one with `pulse topic add <title>`.".yellow());
        return Ok(());
    }

    println!("{}", "Topics".cyan().bold());
    println!("{}", "─".repeat(60));
    for (depth, topic) in tree.outline() {
        let indent = "  ".repeat(depth);
        let marker = if depth == 0 { "●" } else { "└" };
        println!(
            "{}{} {} {} {}",
            indent,
            marker.dimmed(),
            topic.short_id().dimmed(),
            topic.title.bold(),
            format!(
                "[{}] {} event(s), updated {}",
                topic.category,
                topic.events.len(),
                timestamp(topic.last_updated)
            )
            .dimmed()
        );
    }
    Ok(())
}

fn show(workspace: &Workspace, reference: &str, json: bool, raw: bool) -> Result<()> {
    let tree = workspace.tree();
    let topic = tree.resolve(reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(topic)?);
        return Ok(());
    }

    print_summary(tree, topic);

    let children = tree.children(&topic.id);
    if !children.is_empty() {
        println!("  Focus points:");
        for child in children {
            println!("    {} {}", child.short_id().dimmed(), child.title);
        }
    }

    if !topic.relevant_sources.is_empty() {
        println!("  Relevant sources:");
        for site in &topic.relevant_sources {
            println!("    {}", site.blue());
        }
    }

    println!();
    if topic.events.is_empty() {
        println!("{}", "No events tracked yet.".yellow());
        return Ok(());
    }

    println!("{}", format!("Event log ({})", topic.events.len()).cyan().bold());
    for (idx, event) in topic.events.iter().enumerate() {
        println!("{}", "─".repeat(60));
        println!(
            "{} {}",
            format!("#{}", idx + 1).bold(),
            timestamp(event.timestamp).dimmed()
        );
        if raw {
            println!("{}", event.content);
        } else {
            println!("{}", html_to_text(&event.content));
        }
        if !event.source_urls.is_empty() {
            println!("{}", "Sources:".dimmed());
            for url in &event.source_urls {
                println!("  {}", url.blue());
            }
        }
    }
    Ok(())
}

fn edit(workspace: &mut Workspace, reference: &str, patch: TopicPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change. Pass --title, --description or --category.");
    }
    let id = resolve_id(workspace, reference)?;
    let topic = workspace.edit(|tree| tree.update_topic(&id, patch).cloned())?;

    println!("{} Topic updated", "✓".green());
    print_summary(workspace.tree(), &topic);
    Ok(())
}

fn delete(workspace: &mut Workspace, reference: &str, yes: bool) -> Result<()> {
    let topic = workspace.tree().resolve(reference)?.clone();
    let below = workspace.tree().descendants(&topic.id).len();

    if !yes {
        let prompt = if below > 0 {
            format!(
                "Delete '{}' and its {} subtopic(s)? Their events cannot be recovered.",
                topic.title, below
            )
        } else {
            format!("Delete '{}'? Its events cannot be recovered.", topic.title)
        };
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    let removed = workspace.edit(|tree| tree.delete_topic(&topic.id))?;
    println!(
        "{} Deleted {} ({} topic(s) removed)",
        "✓".green(),
        topic.title.cyan(),
        removed.len()
    );
    Ok(())
}

fn focus(workspace: &mut Workspace, parent: &str, text: &str) -> Result<()> {
    let parent_id = resolve_id(workspace, parent)?;
    let topic = workspace.edit(|tree| tree.add_focus_point(&parent_id, text))?;

    println!("{} Focus point added", "✓".green());
    print_summary(workspace.tree(), &topic);
    Ok(())
}

fn print_summary(tree: &TopicTree, topic: &Topic) {
    println!("  ID: {}", topic.id);
    println!("  Title: {}", topic.title.cyan());
    if !topic.description.is_empty() {
        println!("  Description: {}", topic.description);
    }
    println!("  Category: {}", topic.category.yellow());

    let ancestors = tree.ancestors(&topic.id);
    if !ancestors.is_empty() {
        let path: Vec<&str> = ancestors.iter().rev().map(|t| t.title.as_str()).collect();
        println!("  Under: {}", path.join(" › ").dimmed());
    }
    println!("  Last updated: {}", timestamp(topic.last_updated));
}
