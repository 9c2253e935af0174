use std::io::Write;

use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::session::{GameResult, Session};
use crate::util::{format_date_time, mean};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub guess: String,
    pub result: AttemptOutcome,
}

/// A finished game as kept in the history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Assigned by the store on append.
    pub id: Option<i64>,
    pub username: String,
    pub word: String,
    pub attempts: Vec<AttemptRecord>,
    pub points: u32,
    pub result: GameResult,
    /// Seconds spent on the game.
    pub time: u64,
    pub date: Option<DateTime<Local>>,
}

impl GameRecord {
    /// Summarize a finished session. Dates and ids are filled in by the store.
    pub fn from_session(session: &Session) -> Self {
        let attempts = session
            .attempts()
            .iter()
            .map(|guess| AttemptRecord {
                guess: guess.clone(),
                result: if guess.eq_ignore_ascii_case(session.target_word()) {
                    AttemptOutcome::Correct
                } else {
                    AttemptOutcome::Incorrect
                },
            })
            .collect();

        Self {
            id: None,
            username: String::new(),
            word: session.target_word().to_string(),
            attempts,
            points: points_for(session.result(), session.attempts().len(), session.max_attempts()),
            result: session.result(),
            time: session.elapsed_time().as_secs(),
            date: None,
        }
    }
}

/// Ten points per unused row, counting the winning row. Losses score nothing.
pub fn points_for(result: GameResult, attempts_used: usize, max_attempts: usize) -> u32 {
    match result {
        GameResult::Win if attempts_used >= 1 && attempts_used <= max_attempts => {
            ((max_attempts - attempts_used + 1) * 10) as u32
        }
        _ => 0,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySummary {
    pub played: usize,
    pub won: usize,
    pub win_rate: f64,
    pub mean_points: Option<f64>,
    pub mean_time: Option<f64>,
}

impl HistorySummary {
    pub fn from_records(records: &[GameRecord]) -> Self {
        let played = records.len();
        let won = records.iter().filter(|r| r.result.is_win()).count();
        let points: Vec<f64> = records.iter().map(|r| r.points as f64).collect();
        let times: Vec<f64> = records.iter().map(|r| r.time as f64).collect();

        Self {
            played,
            won,
            win_rate: if played > 0 {
                ((won as f64 / played as f64) * 100.0).round()
            } else {
                0.0
            },
            mean_points: mean(&points),
            mean_time: mean(&times),
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    word: &'a str,
    result: String,
    attempts: String,
    points: u32,
    time: u64,
}

/// Write `date,word,result,attempts,points,time` rows, one per game.
pub fn export_csv<W: Write>(records: &[GameRecord], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in records {
        writer.serialize(CsvRow {
            date: format_date_time(record.date.as_ref()),
            word: &record.word,
            result: record.result.to_string(),
            attempts: record.attempts.iter().map(|a| &a.guess).join(" "),
            points: record.points,
            time: record.time,
        })?;
    }
    writer.flush()?;
    Ok(())
}
