//! Word sources: where the daily word comes from and which guesses count as words.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::OracleError;

static WORDS_DIR: Dir = include_dir!("src/words");

pub trait WordOracle: Send + Sync {
    /// Today's target word, uppercase.
    fn daily_word(&self, word_length: usize) -> Result<String, OracleError>;

    /// Whether `word` is an accepted dictionary word.
    fn check_word(&self, word: &str) -> Result<bool, OracleError>;
}

#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordList {
    /// One of the lists bundled into the binary, e.g. `english5`.
    pub fn embedded(name: &str) -> Result<Self, OracleError> {
        let file = WORDS_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| OracleError::UnknownWordList(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| OracleError::UnknownWordList(name.to_string()))?;
        serde_json::from_str(contents).map_err(|_| OracleError::UnknownWordList(name.to_string()))
    }

    /// Bundled list for a word length, if there is one.
    pub fn embedded_for_length(word_length: usize) -> Result<Self, OracleError> {
        Self::embedded(&format!("english{word_length}"))
            .map_err(|_| OracleError::NoWords(word_length))
    }
}

/// Offline oracle backed by a fixed list of words.
#[derive(Debug, Clone)]
pub struct WordListOracle {
    words: Vec<String>,
    lookup: HashSet<String>,
}

impl WordListOracle {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_ascii_uppercase())
            .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphabetic()))
            .filter(|w| seen.insert(w.clone()))
            .collect();
        Self {
            lookup: seen,
            words,
        }
    }

    pub fn embedded(word_length: usize) -> Result<Self, OracleError> {
        Ok(Self::new(WordList::embedded_for_length(word_length)?.words))
    }

    /// Newline-separated word file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OracleError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|_| OracleError::UnknownWordList(path.as_ref().display().to_string()))?;
        Ok(Self::new(contents.lines()))
    }

    /// The word for a given day. Every player gets the same word on the same date.
    pub fn word_for_date(&self, date: NaiveDate, word_length: usize) -> Result<String, OracleError> {
        let candidates: Vec<&String> = self
            .words
            .iter()
            .filter(|w| w.chars().count() == word_length)
            .collect();
        if candidates.is_empty() {
            return Err(OracleError::NoWords(word_length));
        }
        let day = date.num_days_from_ce().unsigned_abs() as usize;
        Ok(candidates[day % candidates.len()].clone())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordOracle for WordListOracle {
    fn daily_word(&self, word_length: usize) -> Result<String, OracleError> {
        self.word_for_date(Local::now().date_naive(), word_length)
    }

    fn check_word(&self, word: &str) -> Result<bool, OracleError> {
        Ok(self.lookup.contains(&word.trim().to_ascii_uppercase()))
    }
}

#[derive(Debug, Deserialize)]
struct DailyWordResponse {
    word: String,
}

#[derive(Debug, Serialize)]
struct CheckWordRequest<'a> {
    word: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckWordResponse {
    valid: bool,
}

/// Remote word service: `GET /api/new-game` and `POST /api/check-word`.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpOracle {
    pub fn new(base_url: impl Into<String>) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl WordOracle for HttpOracle {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    fn daily_word(&self, word_length: usize) -> Result<String, OracleError> {
        let response: DailyWordResponse = self
            .client
            .get(format!("{}/api/new-game", self.base_url))
            .send()?
            .error_for_status()?
            .json()?;
        let word = response.word.trim().to_ascii_uppercase();
        debug!(len = word.len(), "fetched daily word");
        if word.chars().count() != word_length {
            return Err(OracleError::NoWords(word_length));
        }
        Ok(word)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    fn check_word(&self, word: &str) -> Result<bool, OracleError> {
        let response: CheckWordResponse = self
            .client
            .post(format!("{}/api/check-word", self.base_url))
            .json(&CheckWordRequest { word })
            .send()?
            .error_for_status()?
            .json()?;
        Ok(response.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_embedded_lists() {
        let five = WordList::embedded("english5").unwrap();
        assert_eq!(five.size as usize, five.words.len());
        assert!(five.words.iter().all(|w| w.len() == 5));

        let six = WordList::embedded_for_length(6).unwrap();
        assert!(six.words.iter().all(|w| w.len() == 6));

        assert_matches!(WordList::embedded_for_length(9), Err(OracleError::NoWords(9)));
    }

    #[test]
    fn test_check_word_is_case_insensitive() {
        let oracle = WordListOracle::new(["mango", "Money"]);
        assert!(oracle.check_word("MANGO").unwrap());
        assert!(oracle.check_word("money").unwrap());
        assert!(!oracle.check_word("ZZZZZ").unwrap());
    }

    #[test]
    fn test_word_for_date_is_stable_and_rotates() {
        let oracle = WordListOracle::new(["MANGO", "MONEY", "MAGIC", "TOO"]);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let next = day.succ_opt().unwrap();

        let a = oracle.word_for_date(day, 5).unwrap();
        assert_eq!(a, oracle.word_for_date(day, 5).unwrap());
        assert_ne!(a, oracle.word_for_date(next, 5).unwrap());
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_word_for_date_without_candidates() {
        let oracle = WordListOracle::new(["MANGO"]);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_matches!(oracle.word_for_date(day, 6), Err(OracleError::NoWords(6)));
    }

    #[test]
    fn test_new_drops_junk_and_duplicates() {
        let oracle = WordListOracle::new(["mango", "MANGO", "", "ab-cd", " salsa "]);
        assert_eq!(oracle.len(), 2);
        assert!(oracle.check_word("SALSA").unwrap());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "mango\nmoney\n").unwrap();
        let oracle = WordListOracle::from_file(&path).unwrap();
        assert_eq!(oracle.len(), 2);
        assert!(oracle.daily_word(5).is_ok());
    }

    #[test]
    fn test_http_oracle_unreachable_is_network_error() {
        let oracle = HttpOracle::new("http://127.0.0.1:9").unwrap();
        assert_matches!(oracle.check_word("MANGO"), Err(OracleError::Network(_)));
    }
}
