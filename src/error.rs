use thiserror::Error;

/// Errors raised by the game core itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Guess and target differ in length. The front end never lets this happen.
    #[error("guess has {actual} letters, expected {expected}")]
    InvalidGuessLength { expected: usize, actual: usize },

    #[error("target word {0:?} must be {1} letters A-Z")]
    InvalidTarget(String, usize),

    #[error("cell ({row}, {column}) is outside the grid")]
    OutOfBounds { row: usize, column: usize },

    #[error("snapshot does not match a {rows}x{columns} grid")]
    SnapshotShape { rows: usize, columns: usize },
}

/// Failures talking to the word service.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("network error: {0}")]
    Network(String),

    #[error("word list {0:?} not found")]
    UnknownWordList(String),

    #[error("no {0}-letter words available")]
    NoWords(usize),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        OracleError::Network(err.to_string())
    }
}

/// Failures from the session/history store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Recoverable, user-facing problems. Shown as a transient message; never change the board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Notice {
    #[error("Please complete the row before submitting.")]
    IncompleteRow,

    #[error("Word not in list.")]
    WordNotAccepted,

    #[error("Network error, try again.")]
    Network(String),
}
