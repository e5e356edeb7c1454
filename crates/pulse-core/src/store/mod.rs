//! Local key/value store for EventPulse state.
//!
//! State lives in a single SQLite file as JSON values under well-known keys,
//! laid out the way the web app used local storage:
//!
//! | key                      | value                       |
//! |--------------------------|-----------------------------|
//! | `eventpulse_topics_v3`   | current topic list          |
//! | `eventpulse_topics_v2`   | legacy topic list (read-only migration source) |
//! | `eventpulse_briefing_v3` | last generated briefing     |

mod workspace;

pub use workspace::*;

use crate::error::{Error, Result};
use crate::types::{Briefing, Topic, now_millis};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub const TOPICS_KEY: &str = "eventpulse_topics_v3";
pub const LEGACY_TOPICS_KEY: &str = "eventpulse_topics_v2";
pub const BRIEFING_KEY: &str = "eventpulse_briefing_v3";

/// Store file name inside the data directory
pub const STORE_FILE: &str = "pulse.db";

/// Where a loaded topic list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOrigin {
    /// Read from the current schema key
    Current,
    /// Read from the legacy v2 key; will be written back under the current key
    MigratedFromV2,
    /// Nothing usable was stored
    Empty,
}

/// Result of [`Store::load_topics`].
#[derive(Debug, Clone)]
pub struct LoadedTopics {
    pub topics: Vec<Topic>,
    pub origin: StateOrigin,
}

/// SQLite-backed key/value store.
///
/// Thread-safe via internal Mutex. All operations acquire the lock.
pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open `pulse.db` inside `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        Self::open_path(&data_dir.join(STORE_FILE))
    }

    /// Open the store at a specific file path, creating it if needed.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        debug!("Opened store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an existing store file without creating or migrating anything.
    ///
    /// Writes through a read-only store fail.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )?;
        Ok(())
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Raw key/value operations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now_millis()],
        )?;
        Ok(())
    }

    /// Remove every stored key, legacy data included.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        let removed = conn.execute("DELETE FROM kv", [])?;
        info!("Cleared store ({} keys)", removed);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Typed state
    // ─────────────────────────────────────────────────────────────────────────

    /// Load topics, migrating from the v2 key when no current data exists.
    ///
    /// Corrupt values are logged and skipped, never fatal.
    pub fn load_topics(&self) -> Result<LoadedTopics> {
        if let Some(topics) = self.read_json::<Vec<Topic>>(TOPICS_KEY)? {
            return Ok(LoadedTopics {
                topics,
                origin: StateOrigin::Current,
            });
        }

        if let Some(topics) = self.read_json::<Vec<Topic>>(LEGACY_TOPICS_KEY)? {
            info!("Migrating {} topic(s) from {}", topics.len(), LEGACY_TOPICS_KEY);
            return Ok(LoadedTopics {
                topics,
                origin: StateOrigin::MigratedFromV2,
            });
        }

        Ok(LoadedTopics {
            topics: Vec::new(),
            origin: StateOrigin::Empty,
        })
    }

    /// Write topics under the current key. The legacy key is left untouched.
    pub fn save_topics(&self, topics: &[Topic]) -> Result<()> {
        let json = serde_json::to_string(topics)?;
        self.set_item(TOPICS_KEY, &json)?;
        debug!("Saved {} topic(s)", topics.len());
        Ok(())
    }

    pub fn load_briefing(&self) -> Result<Option<Briefing>> {
        self.read_json(BRIEFING_KEY)
    }

    pub fn save_briefing(&self, briefing: &Briefing) -> Result<()> {
        let json = serde_json::to_string(briefing)?;
        self.set_item(BRIEFING_KEY, &json)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_item(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring corrupt value under {}: {}", key, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_CATEGORY;
    use tempfile::tempdir;

    fn topic(id: &str) -> Topic {
        Topic {
            id: id.into(),
            title: id.to_uppercase(),
            description: String::new(),
            category: DEFAULT_CATEGORY.into(),
            events: vec![],
            last_updated: 0,
            parent_id: None,
            relevant_sources: vec![],
        }
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let store = Store::open_in_memory().unwrap();
        let loaded = store.load_topics().unwrap();
        assert!(loaded.topics.is_empty());
        assert_eq!(loaded.origin, StateOrigin::Empty);
        assert!(store.load_briefing().unwrap().is_none());
    }

    #[test]
    fn test_topics_round_trip_under_current_key() {
        let store = Store::open_in_memory().unwrap();
        store.save_topics(&[topic("a"), topic("b")]).unwrap();

        let loaded = store.load_topics().unwrap();
        assert_eq!(loaded.origin, StateOrigin::Current);
        assert_eq!(loaded.topics, vec![topic("a"), topic("b")]);
        assert!(store.get_item(LEGACY_TOPICS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_migrates_from_v2_when_v3_missing() {
        let store = Store::open_in_memory().unwrap();
        let v2 = r#"[{"id":"old","title":"Old","description":"d","category":"c","events":[],"lastUpdated":42}]"#;
        store.set_item(LEGACY_TOPICS_KEY, v2).unwrap();

        let loaded = store.load_topics().unwrap();
        assert_eq!(loaded.origin, StateOrigin::MigratedFromV2);
        assert_eq!(loaded.topics[0].id, "old");
        assert_eq!(loaded.topics[0].last_updated, 42);
        assert!(loaded.topics[0].relevant_sources.is_empty());
        assert!(loaded.topics[0].parent_id.is_none());
    }

    #[test]
    fn test_current_key_wins_over_legacy() {
        let store = Store::open_in_memory().unwrap();
        store.set_item(LEGACY_TOPICS_KEY, r#"[{"id":"old","title":"Old","description":"","category":"c"}]"#).unwrap();
        store.save_topics(&[topic("new")]).unwrap();

        let loaded = store.load_topics().unwrap();
        assert_eq!(loaded.origin, StateOrigin::Current);
        assert_eq!(loaded.topics[0].id, "new");
    }

    #[test]
    fn test_corrupt_current_falls_back_to_legacy() {
        let store = Store::open_in_memory().unwrap();
        store.set_item(TOPICS_KEY, "{not json").unwrap();
        store.set_item(LEGACY_TOPICS_KEY, r#"[{"id":"old","title":"Old","description":"","category":"c"}]"#).unwrap();

        let loaded = store.load_topics().unwrap();
        assert_eq!(loaded.origin, StateOrigin::MigratedFromV2);

        store.set_item(LEGACY_TOPICS_KEY, "garbage").unwrap();
        let loaded = store.load_topics().unwrap();
        assert_eq!(loaded.origin, StateOrigin::Empty);
    }

    #[test]
    fn test_briefing_round_trip_and_clear() {
        let store = Store::open_in_memory().unwrap();
        let briefing = Briefing {
            id: "b1".into(),
            timestamp: 7,
            content: "<h3>Weekly</h3>".into(),
            topic_ids: vec!["a".into()],
        };
        store.save_briefing(&briefing).unwrap();
        store.save_topics(&[topic("a")]).unwrap();
        store.set_item(LEGACY_TOPICS_KEY, "[]").unwrap();
        assert_eq!(store.load_briefing().unwrap(), Some(briefing));

        store.clear().unwrap();
        assert!(store.load_briefing().unwrap().is_none());
        assert_eq!(store.load_topics().unwrap().origin, StateOrigin::Empty);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(STORE_FILE);
        {
            let store = Store::open_path(&path).unwrap();
            store.save_topics(&[topic("persisted")]).unwrap();
        }

        let store = Store::open_path(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(store.load_topics().unwrap().topics[0].id, "persisted");
    }

    #[test]
    fn test_read_only_open_never_creates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent").join(STORE_FILE);
        assert!(Store::open_read_only(&path).is_err());
        assert!(!path.exists());
        assert!(!dir.path().join("absent").exists());

        let path = dir.path().join(STORE_FILE);
        Store::open_path(&path).unwrap().save_topics(&[topic("kept")]).unwrap();

        let store = Store::open_read_only(&path).unwrap();
        assert_eq!(store.load_topics().unwrap().topics[0].id, "kept");
        assert!(store.save_topics(&[]).is_err());
        assert_eq!(store.load_topics().unwrap().topics.len(), 1);
    }
}
