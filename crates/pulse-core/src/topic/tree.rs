//! Topic tree keyed by parent pointers.

use std::collections::{HashSet, VecDeque};

use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{DEFAULT_CATEGORY, NewTopic, Topic, TopicPatch};

/// Shortest id prefix accepted by [`TopicTree::resolve`].
pub const MIN_ID_PREFIX: usize = 4;

/// Fragments this short (after trimming) cannot become focus points.
const MIN_FOCUS_FRAGMENT_CHARS: usize = 3;

/// Insertion-ordered topic forest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicTree {
    topics: Vec<Topic>,
}

impl TopicTree {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| t.id == id)
    }

    /// Find a topic by full id or by a unique id prefix.
    pub fn resolve(&self, reference: &str) -> Result<&Topic> {
        let reference = reference.trim();
        if let Some(topic) = self.get(reference) {
            return Ok(topic);
        }
        if reference.len() < MIN_ID_PREFIX {
            return Err(Error::TopicNotFound(reference.to_string()));
        }

        let mut matches = self.topics.iter().filter(|t| t.id.starts_with(reference));
        match (matches.next(), matches.count()) {
            (None, _) => Err(Error::TopicNotFound(reference.to_string())),
            (Some(topic), 0) => Ok(topic),
            (Some(_), rest) => Err(Error::AmbiguousId {
                prefix: reference.to_string(),
                matches: rest + 1,
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a topic. A parent, if given, must already exist.
    pub fn add_topic(&mut self, input: NewTopic) -> Result<Topic> {
        let title = validate_title(&input.title)?;
        if let Some(parent_id) = &input.parent_id {
            if self.get(parent_id).is_none() {
                return Err(Error::TopicNotFound(parent_id.clone()));
            }
        }

        let category = input
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let topic = Topic {
            id: Uuid::new_v4().to_string(),
            title,
            description: input.description.trim().to_string(),
            category,
            events: Vec::new(),
            last_updated: 0,
            parent_id: input.parent_id,
            relevant_sources: Vec::new(),
        };

        debug!("Adding topic {} ({})", topic.title, topic.id);
        self.topics.push(topic.clone());
        Ok(topic)
    }

    /// Turn a text fragment from a parent's event log into a focus-point subtopic.
    pub fn add_focus_point(&mut self, parent_id: &str, fragment: &str) -> Result<Topic> {
        let fragment = fragment.trim();
        if fragment.chars().count() < MIN_FOCUS_FRAGMENT_CHARS {
            return Err(Error::InvalidInput(format!(
                "focus point text must be at least {} characters",
                MIN_FOCUS_FRAGMENT_CHARS
            )));
        }
        let parent = self
            .get(parent_id)
            .ok_or_else(|| Error::TopicNotFound(parent_id.to_string()))?;

        let input = NewTopic {
            title: fragment.to_string(),
            description: format!("Focus point for \"{}\": {}", parent.title, fragment),
            category: Some(parent.category.clone()),
            parent_id: Some(parent.id.clone()),
        };
        self.add_topic(input)
    }

    /// Apply a partial edit to a topic's descriptive fields.
    pub fn update_topic(&mut self, id: &str, patch: TopicPatch) -> Result<&Topic> {
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let topic = self
            .get_mut(id)
            .ok_or_else(|| Error::TopicNotFound(id.to_string()))?;

        if let Some(title) = title {
            topic.title = title;
        }
        if let Some(description) = patch.description {
            topic.description = description.trim().to_string();
        }
        if let Some(category) = patch.category {
            let category = category.trim();
            if !category.is_empty() {
                topic.category = category.to_string();
            }
        }
        Ok(topic)
    }

    /// Replace a whole topic record, matched by id.
    pub fn replace_topic(&mut self, topic: Topic) -> Result<()> {
        let slot = self
            .get_mut(&topic.id)
            .ok_or_else(|| Error::TopicNotFound(topic.id.clone()))?;
        *slot = topic;
        Ok(())
    }

    /// Remove a topic and its whole subtree. Returns the removed ids.
    pub fn delete_topic(&mut self, id: &str) -> Result<Vec<String>> {
        if self.get(id).is_none() {
            return Err(Error::TopicNotFound(id.to_string()));
        }

        let mut removed = vec![id.to_string()];
        removed.extend(self.descendants(id));
        let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();
        self.topics.retain(|t| !doomed.contains(t.id.as_str()));

        debug!("Deleted {} topic(s) rooted at {}", removed.len(), id);
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Direct children, in insertion order.
    pub fn children(&self, id: &str) -> Vec<&Topic> {
        self.topics
            .iter()
            .filter(|t| t.parent_id.as_deref() == Some(id))
            .collect()
    }

    /// Topics without a (live) parent. Orphans count as roots.
    pub fn roots(&self) -> Vec<&Topic> {
        self.topics
            .iter()
            .filter(|t| match &t.parent_id {
                None => true,
                Some(pid) => self.get(pid).is_none(),
            })
            .collect()
    }

    /// Ids of every topic below `id`, breadth first.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for child in self.children(current) {
                if seen.insert(child.id.as_str()) {
                    out.push(child.id.clone());
                    queue.push_back(child.id.as_str());
                }
            }
        }
        out
    }

    /// Parents of `id`, nearest first.
    pub fn ancestors(&self, id: &str) -> Vec<&Topic> {
        let mut out = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut current = self.get(id).and_then(|t| t.parent_id.as_deref());

        while let Some(pid) = current {
            if !seen.insert(pid) {
                break;
            }
            match self.get(pid) {
                Some(parent) => {
                    out.push(parent);
                    current = parent.parent_id.as_deref();
                }
                None => break,
            }
        }
        out
    }

    /// Depth-first, pre-order listing with nesting depth.
    ///
    /// Topics caught in a parent cycle (only possible with hand-edited data)
    /// are appended at depth 0 so nothing disappears from view.
    pub fn outline(&self) -> Vec<(usize, &Topic)> {
        let mut out = Vec::with_capacity(self.topics.len());
        let mut seen: HashSet<&str> = HashSet::new();

        for root in self.roots() {
            self.walk(root, 0, &mut seen, &mut out);
        }
        for topic in &self.topics {
            if !seen.contains(topic.id.as_str()) {
                self.walk(topic, 0, &mut seen, &mut out);
            }
        }
        out
    }

    fn walk<'a>(
        &'a self,
        topic: &'a Topic,
        depth: usize,
        seen: &mut HashSet<&'a str>,
        out: &mut Vec<(usize, &'a Topic)>,
    ) {
        if !seen.insert(topic.id.as_str()) {
            return;
        }
        out.push((depth, topic));
        for child in self.children(&topic.id) {
            self.walk(child, depth + 1, seen, out);
        }
    }
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("topic title must not be empty".into()));
    }
    Ok(title.to_string())
}
