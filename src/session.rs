use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::grid::{Cursor, Grid};

pub const DEFAULT_WORD_LENGTH: usize = 5;
pub const DEFAULT_MAX_ATTEMPTS: usize = 6;
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub word_length: usize,
    pub max_attempts: usize,
    pub time_limit: Duration,
    /// How long an info message stays visible.
    pub message_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            word_length: DEFAULT_WORD_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            time_limit: DEFAULT_TIME_LIMIT,
            message_ttl: DEFAULT_MESSAGE_TTL,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameResult {
    #[default]
    Unresolved,
    Win,
    LossAttempts,
    LossTimeout,
}

impl GameResult {
    pub fn is_win(&self) -> bool {
        matches!(self, GameResult::Win)
    }
}

/// One guessing game. Mutated only through [`crate::game::Game::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(crate) target_word: String,
    pub(crate) max_attempts: usize,
    pub(crate) grid: Grid,
    pub(crate) cursor: Cursor,
    pub(crate) attempts: Vec<String>,
    pub(crate) elapsed_time: Duration,
    pub(crate) is_game_over: bool,
    pub(crate) result: GameResult,
}

impl Session {
    /// Fresh session. `target_word` must be `word_length` ASCII letters.
    pub fn new(target_word: &str, config: &SessionConfig) -> Result<Self, GameError> {
        let target_word = target_word.trim().to_ascii_uppercase();
        if target_word.chars().count() != config.word_length
            || !target_word.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(GameError::InvalidTarget(target_word, config.word_length));
        }

        Ok(Self {
            grid: Grid::new(config.max_attempts, config.word_length),
            target_word,
            max_attempts: config.max_attempts,
            cursor: Cursor::default(),
            attempts: Vec::new(),
            elapsed_time: Duration::ZERO,
            is_game_over: false,
            result: GameResult::Unresolved,
        })
    }

    pub fn target_word(&self) -> &str {
        &self.target_word
    }

    pub fn word_length(&self) -> usize {
        self.grid.columns()
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn attempts(&self) -> &[String] {
        &self.attempts
    }

    pub fn elapsed_time(&self) -> Duration {
        self.elapsed_time
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    /// True when every cell of the cursor row is filled.
    pub fn row_is_full(&self) -> bool {
        self.cursor.column == self.word_length() + 1
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            word: self.target_word.clone(),
            max_attempts: self.max_attempts,
            grid: self.grid.clone(),
            cursor: self.cursor,
            attempts: self.attempts.clone(),
            elapsed_time: self.elapsed_time,
            is_game_over: self.is_game_over,
            result: self.result,
        }
    }

    /// Rehydrate a saved session verbatim, rejecting snapshots that break the grid invariants.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Result<Self, GameError> {
        let grid = snapshot.grid;
        let shape_error = GameError::SnapshotShape {
            rows: grid.rows(),
            columns: grid.columns(),
        };

        let cursor_ok = snapshot.cursor.row >= 1
            && snapshot.cursor.row <= grid.rows()
            && snapshot.cursor.column >= 1
            && snapshot.cursor.column <= grid.columns() + 1;

        if !grid.is_well_formed()
            || grid.rows() != snapshot.max_attempts
            || grid.columns() != snapshot.word.chars().count()
            || snapshot.attempts.len() > snapshot.max_attempts
            || snapshot.attempts.len() != grid.scored_rows()
            || snapshot.word.is_empty()
            || !snapshot.word.chars().all(|c| c.is_ascii_uppercase())
            || !cursor_ok
        {
            return Err(shape_error);
        }

        Ok(Self {
            target_word: snapshot.word,
            max_attempts: snapshot.max_attempts,
            grid,
            cursor: snapshot.cursor,
            attempts: snapshot.attempts,
            elapsed_time: snapshot.elapsed_time,
            is_game_over: snapshot.is_game_over,
            result: snapshot.result,
        })
    }
}

/// Serializable form of a [`Session`], stored as the user's in-progress game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub word: String,
    pub max_attempts: usize,
    pub grid: Grid,
    pub cursor: Cursor,
    pub attempts: Vec<String>,
    pub elapsed_time: Duration,
    pub is_game_over: bool,
    pub result: GameResult,
}
