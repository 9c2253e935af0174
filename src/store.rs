use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::history::GameRecord;
use crate::session::{GameResult, SessionSnapshot};

/// Storage for the in-progress game and the list of finished games, per user.
pub trait GameStore: Send {
    fn load_session(&self, user_id: &str) -> Result<Option<SessionSnapshot>, StoreError>;
    fn save_session(&mut self, user_id: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError>;
    fn clear_session(&mut self, user_id: &str) -> Result<(), StoreError>;
    /// Store a finished game and return it with its id and date filled in.
    fn append_history(&mut self, user_id: &str, record: &GameRecord) -> Result<GameRecord, StoreError>;
    /// Finished games, newest first.
    fn fetch_history(&self, user_id: &str) -> Result<Vec<GameRecord>, StoreError>;
    /// Live history feed. The current list is delivered immediately.
    fn subscribe_history(&self, user_id: &str) -> Result<HistorySubscription, StoreError>;
}

type Listeners = HashMap<u64, (String, Sender<Vec<GameRecord>>)>;

/// Fan-out of history updates to subscribers, shared by store implementations.
#[derive(Debug, Clone, Default)]
pub struct HistoryHub {
    inner: Arc<Mutex<(u64, Listeners)>>,
}

impl HistoryHub {
    fn lock(&self) -> MutexGuard<'_, (u64, Listeners)> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self, user_id: &str, current: Vec<GameRecord>) -> HistorySubscription {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(current);
        let mut guard = self.lock();
        guard.0 += 1;
        let id = guard.0;
        guard.1.insert(id, (user_id.to_string(), tx));
        debug!(id, user_id, "history subscription added");
        HistorySubscription {
            id,
            rx,
            hub: self.clone(),
        }
    }

    /// Push a fresh list to every subscriber of `user_id`, dropping dead ones.
    pub fn publish(&self, user_id: &str, history: &[GameRecord]) {
        self.lock().1.retain(|_, (owner, tx)| {
            owner.as_str() != user_id || tx.send(history.to_vec()).is_ok()
        });
    }

    fn remove(&self, id: u64) {
        self.lock().1.remove(&id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().1.len()
    }
}

/// Receives history updates until dropped or unsubscribed.
#[derive(Debug)]
pub struct HistorySubscription {
    id: u64,
    rx: Receiver<Vec<GameRecord>>,
    hub: HistoryHub,
}

impl HistorySubscription {
    /// The most recent pending update, if any arrived since the last call.
    pub fn latest(&self) -> Option<Vec<GameRecord>> {
        self.rx.try_iter().last()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<Vec<GameRecord>, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn unsubscribe(self) {}
}

impl Drop for HistorySubscription {
    fn drop(&mut self) {
        self.hub.remove(self.id);
    }
}

/// SQLite-backed store under the user's state directory.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    hub: HistoryHub,
}

impl SqliteStore {
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("motle.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS current_games (
                user_id TEXT PRIMARY KEY,
                snapshot TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                username TEXT NOT NULL,
                word TEXT NOT NULL,
                attempts TEXT NOT NULL,
                points INTEGER NOT NULL,
                result TEXT NOT NULL,
                time_secs INTEGER NOT NULL,
                date TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_games_user_date ON games(user_id, date)",
            [],
        )?;

        Ok(Self {
            conn,
            hub: HistoryHub::default(),
        })
    }

    pub fn hub(&self) -> &HistoryHub {
        &self.hub
    }
}

fn result_from_str(s: &str) -> GameResult {
    match s {
        "win" => GameResult::Win,
        "loss-attempts" => GameResult::LossAttempts,
        "loss-timeout" => GameResult::LossTimeout,
        _ => GameResult::Unresolved,
    }
}

impl GameStore for SqliteStore {
    fn load_session(&self, user_id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT snapshot FROM current_games WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_session(&mut self, user_id: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO current_games (user_id, snapshot, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET snapshot = excluded.snapshot, updated_at = excluded.updated_at
            "#,
            params![user_id, serde_json::to_string(snapshot)?, Local::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear_session(&mut self, user_id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM current_games WHERE user_id = ?1", [user_id])?;
        Ok(())
    }

    fn append_history(&mut self, user_id: &str, record: &GameRecord) -> Result<GameRecord, StoreError> {
        let date = record.date.unwrap_or_else(Local::now);
        self.conn.execute(
            r#"
            INSERT INTO games (user_id, username, word, attempts, points, result, time_secs, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                user_id,
                record.username,
                record.word,
                serde_json::to_string(&record.attempts)?,
                record.points,
                record.result.to_string(),
                record.time,
                date.to_rfc3339(),
            ],
        )?;

        let stored = GameRecord {
            id: Some(self.conn.last_insert_rowid()),
            date: Some(date),
            ..record.clone()
        };
        let history = self.fetch_history(user_id)?;
        self.hub.publish(user_id, &history);
        Ok(stored)
    }

    fn fetch_history(&self, user_id: &str) -> Result<Vec<GameRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, username, word, attempts, points, result, time_secs, date
            FROM games
            WHERE user_id = ?1
            ORDER BY date DESC, id DESC
            "#,
        )?;

        let rows = stmt.query_map([user_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, u64>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, username, word, attempts, points, result, time, date) = row?;
            records.push(GameRecord {
                id: Some(id),
                username,
                word,
                attempts: serde_json::from_str(&attempts)?,
                points,
                result: result_from_str(&result),
                time,
                date: DateTime::parse_from_rfc3339(&date)
                    .ok()
                    .map(|d| d.with_timezone(&Local)),
            });
        }
        Ok(records)
    }

    fn subscribe_history(&self, user_id: &str) -> Result<HistorySubscription, StoreError> {
        Ok(self.hub.subscribe(user_id, self.fetch_history(user_id)?))
    }
}

/// In-process store, used by tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: HashMap<String, SessionSnapshot>,
    history: HashMap<String, Vec<GameRecord>>,
    next_id: i64,
    hub: HistoryHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hub(&self) -> &HistoryHub {
        &self.hub
    }
}

impl GameStore for MemoryStore {
    fn load_session(&self, user_id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        Ok(self.sessions.get(user_id).cloned())
    }

    fn save_session(&mut self, user_id: &str, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.sessions.insert(user_id.to_string(), snapshot.clone());
        Ok(())
    }

    fn clear_session(&mut self, user_id: &str) -> Result<(), StoreError> {
        self.sessions.remove(user_id);
        Ok(())
    }

    fn append_history(&mut self, user_id: &str, record: &GameRecord) -> Result<GameRecord, StoreError> {
        self.next_id += 1;
        let stored = GameRecord {
            id: Some(self.next_id),
            date: Some(record.date.unwrap_or_else(Local::now)),
            ..record.clone()
        };
        let list = self.history.entry(user_id.to_string()).or_default();
        list.insert(0, stored.clone());
        self.hub.publish(user_id, list);
        Ok(stored)
    }

    fn fetch_history(&self, user_id: &str) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.history.get(user_id).cloned().unwrap_or_default())
    }

    fn subscribe_history(&self, user_id: &str) -> Result<HistorySubscription, StoreError> {
        Ok(self.hub.subscribe(user_id, self.fetch_history(user_id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{AttemptOutcome, AttemptRecord};
    use crate::session::{Session, SessionConfig};

    fn snapshot() -> SessionSnapshot {
        Session::new("MANGO", &SessionConfig::default())
            .unwrap()
            .snapshot()
    }

    fn record(word: &str, result: GameResult) -> GameRecord {
        GameRecord {
            id: None,
            username: "User_abc".into(),
            word: word.into(),
            attempts: vec![AttemptRecord {
                guess: word.into(),
                result: AttemptOutcome::Correct,
            }],
            points: 60,
            result,
            time: 42,
            date: None,
        }
    }

    fn exercise_sessions(store: &mut dyn GameStore) {
        assert!(store.load_session("u1").unwrap().is_none());

        let snap = snapshot();
        store.save_session("u1", &snap).unwrap();
        assert_eq!(store.load_session("u1").unwrap(), Some(snap.clone()));

        let mut later = snap.clone();
        later.attempts.push("MONEY".into());
        store.save_session("u1", &later).unwrap();
        assert_eq!(store.load_session("u1").unwrap(), Some(later));
        assert!(store.load_session("u2").unwrap().is_none());

        store.clear_session("u1").unwrap();
        assert!(store.load_session("u1").unwrap().is_none());
    }

    fn exercise_history(store: &mut dyn GameStore) {
        let first = store.append_history("u1", &record("MANGO", GameResult::Win)).unwrap();
        assert!(first.id.is_some());
        assert!(first.date.is_some());
        store
            .append_history("u1", &record("MONEY", GameResult::LossTimeout))
            .unwrap();
        store.append_history("u2", &record("OTHER", GameResult::Win)).unwrap();

        let history = store.fetch_history("u1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].word, "MONEY");
        assert_eq!(history[0].result, GameResult::LossTimeout);
        assert_eq!(history[1].attempts[0].guess, "MANGO");
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        exercise_sessions(&mut store);
        exercise_history(&mut store);
    }

    #[test]
    fn test_sqlite_store() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        exercise_sessions(&mut store);
        exercise_history(&mut store);
    }

    #[test]
    fn test_sqlite_store_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("motle.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.save_session("u1", &snapshot()).unwrap();
            store.append_history("u1", &record("MANGO", GameResult::Win)).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_session("u1").unwrap(), Some(snapshot()));
        assert_eq!(store.fetch_history("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_subscription_receives_updates_for_its_user() {
        let mut store = MemoryStore::new();
        store.append_history("u1", &record("MANGO", GameResult::Win)).unwrap();

        let sub = store.subscribe_history("u1").unwrap();
        assert_eq!(sub.latest().map(|h| h.len()), Some(1));

        store.append_history("u2", &record("OTHER", GameResult::Win)).unwrap();
        assert!(sub.latest().is_none());

        store.append_history("u1", &record("MONEY", GameResult::LossAttempts)).unwrap();
        let update = sub.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(update.len(), 2);
        assert_eq!(update[0].word, "MONEY");
    }

    #[test]
    fn test_unsubscribe_removes_listener() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let sub = store.subscribe_history("u1").unwrap();
        let other = store.subscribe_history("u1").unwrap();
        assert_eq!(store.hub().subscriber_count(), 2);

        sub.unsubscribe();
        assert_eq!(store.hub().subscriber_count(), 1);
        drop(other);
        assert_eq!(store.hub().subscriber_count(), 0);

        store.append_history("u1", &record("MANGO", GameResult::Win)).unwrap();
    }
}
