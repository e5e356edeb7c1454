//! In-memory working state bound to a [`Store`].
//!
//! A `Workspace` can only be built by loading from a store, and it writes
//! back only after a successful mutation. Opening state and walking away
//! never rewrites it, so an empty tree can't clobber saved data.

use tracing::info;

use super::{StateOrigin, Store};
use crate::error::{Error, Result};
use crate::topic::{TopicTree, record_update};
use crate::types::{Briefing, EventItem, FetchedUpdate};

pub struct Workspace {
    store: Store,
    tree: TopicTree,
    briefing: Option<Briefing>,
    origin: StateOrigin,
}

impl Workspace {
    /// Load topics and the last briefing from `store`.
    pub fn load(store: Store) -> Result<Self> {
        let loaded = store.load_topics()?;
        let briefing = store.load_briefing()?;
        Ok(Self {
            store,
            tree: TopicTree::new(loaded.topics),
            briefing,
            origin: loaded.origin,
        })
    }

    pub fn tree(&self) -> &TopicTree {
        &self.tree
    }

    pub fn briefing(&self) -> Option<&Briefing> {
        self.briefing.as_ref()
    }

    pub fn origin(&self) -> StateOrigin {
        self.origin
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Re-read topics and the briefing from the store.
    ///
    /// Another process may have written since this workspace was loaded.
    pub fn reload(&mut self) -> Result<()> {
        let loaded = self.store.load_topics()?;
        self.tree = TopicTree::new(loaded.topics);
        self.origin = loaded.origin;
        self.briefing = self.store.load_briefing()?;
        Ok(())
    }

    /// Run a mutation against freshly loaded topics and persist it if it succeeds.
    ///
    /// Every save is read-modify-write against the store, so changes made by
    /// another process in the meantime are kept. A failed mutation is not
    /// written.
    pub fn edit<T>(&mut self, f: impl FnOnce(&mut TopicTree) -> Result<T>) -> Result<T> {
        self.reload()?;
        let value = f(&mut self.tree)?;
        self.store.save_topics(self.tree.topics())?;
        if self.origin == StateOrigin::MigratedFromV2 {
            info!("Migrated topics written under the current schema key");
        }
        self.origin = StateOrigin::Current;
        Ok(value)
    }

    /// Record a fetched update against a topic and persist.
    pub fn apply_update(&mut self, topic_id: &str, update: FetchedUpdate, now: i64) -> Result<EventItem> {
        self.edit(|tree| {
            let mut topic = tree
                .get(topic_id)
                .cloned()
                .ok_or_else(|| Error::TopicNotFound(topic_id.to_string()))?;
            let event = record_update(&mut topic, update, now);
            tree.replace_topic(topic)?;
            Ok(event)
        })
    }

    pub fn set_briefing(&mut self, briefing: Briefing) -> Result<()> {
        self.store.save_briefing(&briefing)?;
        self.briefing = Some(briefing);
        Ok(())
    }

    /// Drop every topic and the briefing, wiping the store.
    pub fn clear_all(&mut self) -> Result<()> {
        self.store.clear()?;
        self.tree.clear();
        self.briefing = None;
        self.origin = StateOrigin::Empty;
        Ok(())
    }
}
