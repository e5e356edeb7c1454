//! Shared types for pulse-core.
//!
//! These types are used by the store, the topic tree and the CLI. Field names
//! serialize as camelCase so records written by earlier EventPulse versions
//! load unchanged.

use serde::{Deserialize, Serialize};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "general";

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ─────────────────────────────────────────────────────────────────────────────
// Entity Types
// ─────────────────────────────────────────────────────────────────────────────

/// One intelligence update recorded against a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventItem {
    pub id: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// HTML summary returned by the model
    pub content: String,
    #[serde(default)]
    pub source_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub events: Vec<EventItem>,
    /// Epoch milliseconds of the last successful refresh, 0 if never refreshed
    #[serde(default)]
    pub last_updated: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Sites the model reported as highly relevant (absent in v2 records)
    #[serde(default)]
    pub relevant_sources: Vec<String>,
}

impl Topic {
    /// Whether this topic has never been refreshed.
    pub fn is_new(&self) -> bool {
        self.last_updated == 0
    }

    /// Short id for display.
    pub fn short_id(&self) -> &str {
        self.id
            .char_indices()
            .nth(8)
            .map_or(&self.id[..], |(i, _)| &self.id[..i])
    }
}

/// Cross-topic briefing produced from every topic's recent events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Briefing {
    pub id: String,
    pub timestamp: i64,
    pub content: String,
    pub topic_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: now_millis(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            timestamp: now_millis(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input Types
// ─────────────────────────────────────────────────────────────────────────────

/// Input for creating a new topic
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTopic {
    pub title: String,
    pub description: String,
    /// Falls back to [`DEFAULT_CATEGORY`] when `None`
    pub category: Option<String>,
    pub parent_id: Option<String>,
}

/// Partial edit of a topic's descriptive fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl TopicPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.category.is_none()
    }
}

/// Parsed result of one grounded search for a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedUpdate {
    /// HTML summary with the relevant-sites trailer removed
    pub summary: String,
    /// Grounding URLs reported by the provider
    pub sources: Vec<String>,
    /// Sites the model listed in its relevant-sites trailer
    pub relevant_websites: Vec<String>,
}
