//! Append-only session history per (machine, category).
//!
//! Each history lives under the key `"<machine number>_<CATEGORY>"` as a JSON
//! array of sessions, oldest first. Every read goes back to the underlying
//! store; nothing is cached.

use crate::store::KvStore;
use crate::{Category, Error, Machine, Result, Session};
use serde_json::Value;

/// Storage key for a machine/category pair, e.g. `15_HEAVY`
pub fn history_key(machine: &Machine, category: Category) -> String {
    format!("{}_{}", machine.number, category)
}

/// Session history backed by a key-value store
pub struct HistoryStore<S: KvStore> {
    store: S,
    retention: Option<usize>,
}

impl<S: KvStore> HistoryStore<S> {
    /// Create a history store with unbounded retention
    pub fn new(store: S) -> Self {
        Self {
            store,
            retention: None,
        }
    }

    /// Keep only the newest `max_sessions` per key on append
    ///
    /// This is an opt-in behaviour change: by default history is never
    /// trimmed. A limit of zero is rejected with [`Error::Config`].
    pub fn with_retention(mut self, max_sessions: usize) -> Result<Self> {
        if max_sessions == 0 {
            return Err(Error::Config(
                "history retention must keep at least one session".into(),
            ));
        }
        self.retention = Some(max_sessions);
        Ok(self)
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the underlying store, for data kept beside the history
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Load the full history for a key, oldest first
    ///
    /// Missing history is an empty Vec. Unreadable or malformed data is logged
    /// as a warning and also reported as empty.
    pub fn load(&self, machine: &Machine, category: Category) -> Vec<Session> {
        match self.try_load(machine, category) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(
                    "Ignoring history for {} {}: {}",
                    machine.label(),
                    category,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Load the full history, surfacing malformed data as an error
    pub fn try_load(&self, machine: &Machine, category: Category) -> Result<Vec<Session>> {
        let key = history_key(machine, category);
        let sessions = match self.store.get(&key)? {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => {
                serde_json::from_value::<Vec<Session>>(value).map_err(|e| Error::MalformedData {
                    key: key.clone(),
                    reason: e.to_string(),
                })?
            }
        };
        tracing::debug!("Loaded {} sessions for {}", sessions.len(), key);
        Ok(sessions)
    }

    /// Most recently appended session, if any
    pub fn last(&self, machine: &Machine, category: Category) -> Option<Session> {
        self.load(machine, category).pop()
    }

    /// Append a session at the most-recent end of the history
    ///
    /// The whole array is written back in a single `set`, so a failed write
    /// leaves the previous history intact. Appending onto malformed data is
    /// refused rather than replacing it.
    pub fn append(&mut self, machine: &Machine, category: Category, session: Session) -> Result<()> {
        let key = history_key(machine, category);
        let mut sessions = self.try_load(machine, category)?;
        sessions.push(session);

        if let Some(max) = self.retention {
            if sessions.len() > max {
                let excess = sessions.len() - max;
                sessions.drain(..excess);
                tracing::debug!("Trimmed {} old sessions from {}", excess, key);
            }
        }

        let value = serde_json::to_value(&sessions)?;
        self.store.set(&key, value)?;

        tracing::info!("Appended session to {} ({} total)", key, sessions.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonFileStore, MemoryStore};
    use crate::{get_default_catalog, Set};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn press() -> &'static Machine {
        get_default_catalog().machine_by_id("PRESS").unwrap()
    }

    fn session(ms: i64, reps: u32, weight: f64) -> Session {
        Session::new(
            Utc.timestamp_millis_opt(ms).unwrap(),
            vec![Set::new(reps, weight)],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_history_key_format() {
        assert_eq!(history_key(press(), Category::Heavy), "15_HEAVY");
        assert_eq!(history_key(press(), Category::Core), "15_CORE");
    }

    #[test]
    fn test_load_empty_history() {
        let history = HistoryStore::new(MemoryStore::new());
        assert!(history.load(press(), Category::Heavy).is_empty());
        assert!(history.last(press(), Category::Heavy).is_none());
    }

    #[test]
    fn test_append_preserves_order() {
        let mut history = HistoryStore::new(MemoryStore::new());
        let first = session(1_000, 8, 100.0);
        let second = session(2_000, 6, 105.0);

        history.append(press(), Category::Heavy, first.clone()).unwrap();
        history.append(press(), Category::Heavy, second.clone()).unwrap();

        assert_eq!(history.last(press(), Category::Heavy), Some(second.clone()));
        assert_eq!(history.load(press(), Category::Heavy), vec![first, second]);
    }

    #[test]
    fn test_categories_are_independent() {
        let mut history = HistoryStore::new(MemoryStore::new());
        history
            .append(press(), Category::Heavy, session(1_000, 8, 100.0))
            .unwrap();

        assert!(history.load(press(), Category::Light).is_empty());
        assert_eq!(history.load(press(), Category::Heavy).len(), 1);
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let mut history = HistoryStore::new(MemoryStore::new());
        history
            .append(press(), Category::Heavy, session(1_000, 8, 100.0))
            .unwrap();

        let a = history.load(press(), Category::Heavy);
        let b = history.load(press(), Category::Heavy);
        assert_eq!(a, b);
        assert_eq!(
            history.last(press(), Category::Heavy),
            history.last(press(), Category::Heavy)
        );
    }

    #[test]
    fn test_stored_shape_matches_wire_format() {
        let mut history = HistoryStore::new(MemoryStore::new());
        history
            .append(press(), Category::Heavy, session(1_000, 8, 100.0))
            .unwrap();

        let raw = history.store().get("15_HEAVY").unwrap().unwrap();
        assert_eq!(raw, json!([{"time": 1000, "sets": [{"reps": 8, "weight": 100.0}]}]));
    }

    #[test]
    fn test_malformed_history_loads_as_empty() {
        crate::logging::init_test();
        let mut store = MemoryStore::new();
        store.set("15_HEAVY", json!({"not": "an array"})).unwrap();
        let history = HistoryStore::new(store);

        assert!(history.load(press(), Category::Heavy).is_empty());
        assert!(matches!(
            history.try_load(press(), Category::Heavy),
            Err(Error::MalformedData { .. })
        ));
    }

    #[test]
    fn test_append_refuses_to_overwrite_malformed_history() {
        let mut store = MemoryStore::new();
        store.set("15_HEAVY", json!("garbage")).unwrap();
        let mut history = HistoryStore::new(store);

        let result = history.append(press(), Category::Heavy, session(1_000, 8, 100.0));
        assert!(matches!(result, Err(Error::MalformedData { .. })));
        assert_eq!(history.store().get("15_HEAVY").unwrap(), Some(json!("garbage")));
    }

    #[test]
    fn test_retention_keeps_newest() {
        let mut history = HistoryStore::new(MemoryStore::new())
            .with_retention(2)
            .unwrap();
        for i in 1..=4 {
            history
                .append(press(), Category::Heavy, session(i * 1_000, 8, 100.0 + i as f64))
                .unwrap();
        }

        let sessions = history.load(press(), Category::Heavy);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].sets()[0].weight, 103.0);
        assert_eq!(sessions[1].sets()[0].weight, 104.0);
    }

    #[test]
    fn test_zero_retention_rejected() {
        let result = HistoryStore::new(MemoryStore::new()).with_retention(0);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut history = HistoryStore::new(MemoryStore::new());
        for i in 0..60 {
            history
                .append(press(), Category::Light, session(i, 12, 50.0))
                .unwrap();
        }
        assert_eq!(history.load(press(), Category::Light).len(), 60);
    }

    #[test]
    fn test_file_backed_history_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.json");

        let mut history = HistoryStore::new(JsonFileStore::new(&path));
        history
            .append(press(), Category::Heavy, session(1_000, 8, 100.0))
            .unwrap();

        let reopened = HistoryStore::new(JsonFileStore::new(&path));
        let last = reopened.last(press(), Category::Heavy).unwrap();
        assert_eq!(last.sets(), &[Set::new(8, 100.0)]);
    }

    #[test]
    fn test_corrupt_file_loads_as_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.json");
        std::fs::write(&path, "not json at all").unwrap();

        let history = HistoryStore::new(JsonFileStore::new(&path));
        assert!(history.load(press(), Category::Heavy).is_empty());
    }
}
