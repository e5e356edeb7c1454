//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// EventPulse CLI
///
/// Monitor topics with AI-generated intelligence updates, cross-topic
/// briefings and per-topic chat.
#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Topic management (add, list, show, edit, delete, focus)
    Topic(TopicCommand),

    /// Fetch the latest developments for a topic (or every topic)
    Refresh {
        /// Topic ID or unique prefix
        id: Option<String>,

        /// Refresh every topic
        #[arg(short, long, conflicts_with = "id")]
        all: bool,
    },

    /// Refresh every topic periodically until interrupted
    Watch {
        /// Seconds between passes (defaults to watch.interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Global briefing across all topics
    Briefing(BriefingCommand),

    /// Interactive chat about a topic's tracked events
    Chat {
        /// Topic ID or unique prefix
        id: String,
    },

    /// Ask a single question about a topic's tracked events
    Ask {
        /// Topic ID or unique prefix
        id: String,
        /// Question to ask
        question: String,
    },

    /// Delete all topics and the briefing
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Configuration inspection
    Config(ConfigCommand),

    /// Run diagnostics
    Doctor,

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Topic Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct TopicCommand {
    #[command(subcommand)]
    pub action: TopicAction,
}

#[derive(Subcommand, Debug)]
pub enum TopicAction {
    /// Add a topic to monitor
    Add {
        /// Topic title
        title: String,

        /// What to track about it
        #[arg(short, long, default_value = "")]
        description: String,

        /// Category label
        #[arg(short, long)]
        category: Option<String>,

        /// Parent topic ID (creates a subtopic)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// List topics as a tree
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a topic and its event log
    Show {
        /// Topic ID or unique prefix
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Print event content as stored (HTML)
        #[arg(long)]
        raw: bool,
    },

    /// Edit a topic's title, description or category
    Edit {
        /// Topic ID or unique prefix
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        category: Option<String>,
    },

    /// Delete a topic and all of its subtopics
    Delete {
        /// Topic ID or unique prefix
        id: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Turn a piece of text into a focus-point subtopic
    Focus {
        /// Parent topic ID or unique prefix
        parent: String,

        /// Text to focus on (becomes the subtopic title)
        text: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Briefing Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct BriefingCommand {
    #[command(subcommand)]
    pub action: BriefingAction,
}

#[derive(Subcommand, Debug)]
pub enum BriefingAction {
    /// Generate a new briefing from every topic's recent events
    Generate,

    /// Show the last briefing
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Print content as stored (HTML)
        #[arg(long)]
        raw: bool,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}
