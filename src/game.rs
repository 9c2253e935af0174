use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{GameError, Notice};
use crate::evaluate::{evaluate, is_win, keyboard_hints, LetterStatus};
use crate::grid::{CellStatus, Cursor, Grid};
use crate::history::GameRecord;
use crate::session::{GameResult, Session, SessionConfig, SessionSnapshot};
use crate::timer::{format_remaining, CountdownTimer};

/// Identifies one in-flight word validation.
pub type Ticket = u64;

// Unique across all games in the process, so answers for a replaced game never match.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    Rejected,
    NetworkError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Letter(char),
    Backspace,
    Submit,
    /// Answer to an earlier [`Effect::Validate`].
    ValidationResolved { ticket: Ticket, outcome: Validation },
    Tick(Duration),
    TimerExpired,
    Abandon,
    Pause,
    Resume,
}

/// Work requested by a transition, in the order it must happen.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Validate { ticket: Ticket, word: String },
    Save(SessionSnapshot),
    Archive(GameRecord),
    Clear,
    Message(Notice),
}

#[derive(Debug, Clone)]
pub struct InfoMessage {
    pub notice: Notice,
    pub shown_at: Instant,
}

/// The guessing state machine. All mutation goes through [`Game::dispatch`].
#[derive(Debug)]
pub struct Game {
    session: Session,
    timer: CountdownTimer,
    paused: bool,
    pending: Option<Ticket>,
    message: Option<InfoMessage>,
    message_ttl: Duration,
}

impl Game {
    pub fn new(target_word: &str, config: &SessionConfig) -> Result<Self, GameError> {
        let session = Session::new(target_word, config)?;
        let mut timer = CountdownTimer::new();
        timer.start(config.time_limit);
        info!(word_length = config.word_length, max_attempts = config.max_attempts, "new game");
        Ok(Self::with_parts(session, timer, config))
    }

    /// Resume a saved game. Time already spent is taken off the configured limit.
    pub fn restore(snapshot: SessionSnapshot, config: &SessionConfig) -> Result<Self, GameError> {
        let session = Session::from_snapshot(snapshot)?;
        let mut timer = CountdownTimer::new();
        timer.start(config.time_limit.saturating_sub(session.elapsed_time));
        if session.is_game_over {
            timer.stop();
        }
        info!(
            row = session.cursor.row,
            attempts = session.attempts.len(),
            game_over = session.is_game_over,
            "restored game"
        );
        Ok(Self::with_parts(session, timer, config))
    }

    fn with_parts(session: Session, timer: CountdownTimer, config: &SessionConfig) -> Self {
        Self {
            session,
            timer,
            paused: false,
            pending: None,
            message: None,
            message_ttl: config.message_ttl,
        }
    }

    pub fn dispatch(&mut self, event: GameEvent) -> Result<Vec<Effect>, GameError> {
        if self.session.is_game_over {
            if !matches!(event, GameEvent::Tick(_)) {
                debug!(?event, "ignored after game over");
            }
            return Ok(vec![]);
        }
        if self.timer.has_expired() {
            // Restored with no time left: the clock wins over whatever arrived.
            debug!(?event, "clock already ran out");
            return Ok(self.finish(GameResult::LossTimeout));
        }

        match event {
            GameEvent::Letter(c) => Ok(self.on_letter(c)),
            GameEvent::Backspace => Ok(self.on_backspace()),
            GameEvent::Submit => Ok(self.on_submit()),
            GameEvent::ValidationResolved { ticket, outcome } => self.on_validation(ticket, outcome),
            GameEvent::Tick(elapsed) => Ok(self.on_tick(elapsed)),
            GameEvent::TimerExpired => Ok(self.finish(GameResult::LossTimeout)),
            GameEvent::Abandon => Ok(self.on_abandon()),
            GameEvent::Pause => Ok(self.on_pause()),
            GameEvent::Resume => {
                if self.paused {
                    self.paused = false;
                    self.timer.resume();
                }
                Ok(vec![])
            }
        }
    }

    fn accepts_input(&self) -> bool {
        !self.paused && self.pending.is_none() && !self.timer.has_expired()
    }

    fn on_letter(&mut self, c: char) -> Vec<Effect> {
        if !self.accepts_input() || !c.is_ascii_alphabetic() {
            return vec![];
        }
        let Cursor { row, column } = self.session.cursor;
        if column > self.session.word_length() {
            return vec![];
        }
        if self.session.grid.set_letter(row, column, c.to_ascii_uppercase()).is_err() {
            return vec![];
        }
        self.session.cursor.column += 1;
        vec![self.save()]
    }

    // One backspace erases exactly one trailing filled cell, including from a full row.
    fn on_backspace(&mut self) -> Vec<Effect> {
        if !self.accepts_input() {
            return vec![];
        }
        let Cursor { row, column } = self.session.cursor;
        if column <= 1 {
            return vec![];
        }
        if self.session.grid.clear(row, column - 1).is_err() {
            return vec![];
        }
        self.session.cursor.column = column - 1;
        vec![self.save()]
    }

    fn on_submit(&mut self) -> Vec<Effect> {
        if !self.accepts_input() {
            return vec![];
        }
        let row = self.session.cursor.row;
        if !self.session.row_is_full() || row > self.session.max_attempts {
            return vec![self.notify(Notice::IncompleteRow)];
        }
        let word = match self.session.grid.row_word(row) {
            Ok(word) => word,
            Err(_) => return vec![self.notify(Notice::IncompleteRow)],
        };

        let ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        self.pending = Some(ticket);
        debug!(ticket, %word, "validating guess");
        vec![Effect::Validate { ticket, word }]
    }

    fn on_validation(&mut self, ticket: Ticket, outcome: Validation) -> Result<Vec<Effect>, GameError> {
        if self.pending != Some(ticket) {
            debug!(ticket, "discarding stale validation");
            return Ok(vec![]);
        }
        self.pending = None;

        match outcome {
            Validation::Rejected => Ok(vec![self.notify(Notice::WordNotAccepted)]),
            Validation::NetworkError(err) => {
                warn!(%err, "word validation failed");
                Ok(vec![self.notify(Notice::Network(err))])
            }
            Validation::Accepted => self.score_row(),
        }
    }

    fn score_row(&mut self) -> Result<Vec<Effect>, GameError> {
        let row = self.session.cursor.row;
        let word = self.session.grid.row_word(row)?;
        let statuses = evaluate(&word, &self.session.target_word)?;

        // Everything fallible is done; commit.
        self.session.grid.apply_statuses(row, &statuses)?;
        self.session.attempts.push(word);

        if is_win(&statuses) {
            return Ok(self.finish(GameResult::Win));
        }
        if row >= self.session.max_attempts {
            return Ok(self.finish(GameResult::LossAttempts));
        }
        self.session.cursor = Cursor { row: row + 1, column: 1 };
        Ok(vec![self.save()])
    }

    // Saves once per whole second of play so a restart never hands time back.
    fn on_tick(&mut self, elapsed: Duration) -> Vec<Effect> {
        if self.paused {
            return vec![];
        }
        let before = self.timer.remaining();
        let seconds = self.session.elapsed_time.as_secs();
        let fired = self.timer.tick(elapsed);
        self.session.elapsed_time += before - self.timer.remaining();
        if fired {
            return self.finish(GameResult::LossTimeout);
        }
        if self.session.elapsed_time.as_secs() != seconds {
            return vec![self.save()];
        }
        vec![]
    }

    fn on_abandon(&mut self) -> Vec<Effect> {
        self.end(GameResult::LossAttempts);
        info!("game abandoned");
        vec![Effect::Clear]
    }

    fn on_pause(&mut self) -> Vec<Effect> {
        if self.paused {
            return vec![];
        }
        self.paused = true;
        self.timer.pause();
        vec![self.save()]
    }

    fn end(&mut self, result: GameResult) {
        self.session.result = result;
        self.session.is_game_over = true;
        self.pending = None;
        self.paused = false;
        self.timer.stop();
    }

    fn finish(&mut self, result: GameResult) -> Vec<Effect> {
        self.end(result);
        info!(
            %result,
            attempts = self.session.attempts.len(),
            elapsed_secs = self.session.elapsed_time.as_secs(),
            "game over"
        );
        vec![self.save(), Effect::Archive(GameRecord::from_session(&self.session))]
    }

    fn save(&self) -> Effect {
        Effect::Save(self.session.snapshot())
    }

    fn notify(&mut self, notice: Notice) -> Effect {
        self.message = Some(InfoMessage {
            notice: notice.clone(),
            shown_at: Instant::now(),
        });
        Effect::Message(notice)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn grid(&self) -> &Grid {
        &self.session.grid
    }

    pub fn cursor(&self) -> Cursor {
        self.session.cursor
    }

    pub fn is_game_over(&self) -> bool {
        self.session.is_game_over
    }

    pub fn result(&self) -> GameResult {
        self.session.result
    }

    pub fn is_validating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    pub fn remaining_display(&self) -> String {
        format_remaining(self.timer.remaining())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// The current message, until it has been visible for the configured time.
    pub fn info_message(&self, now: Instant) -> Option<&Notice> {
        self.message
            .as_ref()
            .filter(|m| now.saturating_duration_since(m.shown_at) < self.message_ttl)
            .map(|m| &m.notice)
    }

    /// Best known status per letter, from submitted rows only.
    pub fn keyboard_hints(&self) -> HashMap<char, LetterStatus> {
        let scored: Vec<(String, Vec<LetterStatus>)> = self
            .session
            .grid
            .iter_rows()
            .take(self.session.attempts.len())
            .map(|cells| {
                let word: String = cells.iter().filter_map(|c| c.letter).collect();
                let statuses = cells
                    .iter()
                    .filter_map(|c| match c.status {
                        CellStatus::Correct => Some(LetterStatus::Correct),
                        CellStatus::Present => Some(LetterStatus::Present),
                        CellStatus::Absent => Some(LetterStatus::Absent),
                        CellStatus::Empty | CellStatus::Pending => None,
                    })
                    .collect();
                (word, statuses)
            })
            .collect();
        keyboard_hints(scored.iter().map(|(w, s)| (w.as_str(), s.as_slice())))
    }
}
