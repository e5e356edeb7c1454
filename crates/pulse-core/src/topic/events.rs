//! Event accumulation for refreshed topics.

use std::collections::HashSet;

use uuid::Uuid;

use crate::types::{EventItem, FetchedUpdate, Topic};

/// Append a fetched update to a topic's event log.
///
/// Sets `last_updated` to `now` and merges the reported relevant websites into
/// the topic's relevant sources, keeping existing entries first.
pub fn record_update(topic: &mut Topic, update: FetchedUpdate, now: i64) -> EventItem {
    let event = EventItem {
        id: Uuid::new_v4().to_string(),
        timestamp: now,
        content: update.summary,
        source_urls: update.sources,
    };

    topic.events.push(event.clone());
    topic.last_updated = now;
    merge_sources(&mut topic.relevant_sources, update.relevant_websites);

    event
}

/// Order-preserving set union of `incoming` into `existing`.
///
/// Duplicates already present in `existing` are dropped too.
pub fn merge_sources(existing: &mut Vec<String>, incoming: Vec<String>) {
    let mut seen = HashSet::new();
    let merged: Vec<String> = existing
        .drain(..)
        .chain(incoming)
        .filter(|site| seen.insert(site.clone()))
        .collect();
    *existing = merged;
}

/// The last `n` events of a topic, oldest first.
pub fn recent_events(topic: &Topic, n: usize) -> &[EventItem] {
    let start = topic.events.len().saturating_sub(n);
    &topic.events[start..]
}
