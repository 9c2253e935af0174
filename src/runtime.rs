use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::debug;

use crate::game::{Ticket, Validation};
use crate::oracle::WordOracle;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// A word check started by [`spawn_validation`] has finished.
    Validated { ticket: Ticket, outcome: Validation },
}

/// Source of terminal and background events
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Handle for background work to post events back into the loop.
    fn sender(&self) -> Sender<AppEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => input_tx.send(AppEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => input_tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Scripted event source for tests
pub struct TestEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.event_source.sender()
    }
}

/// Check `word` on a worker thread and post the answer as [`AppEvent::Validated`].
/// The game stays responsive to ticks while the oracle is slow.
pub fn spawn_validation(
    oracle: Arc<dyn WordOracle>,
    ticket: Ticket,
    word: String,
    tx: Sender<AppEvent>,
) {
    std::thread::spawn(move || {
        let outcome = match oracle.check_word(&word) {
            Ok(true) => Validation::Accepted,
            Ok(false) => Validation::Rejected,
            Err(err) => Validation::NetworkError(err.to_string()),
        };
        debug!(ticket, %word, ?outcome, "validation finished");
        // The loop may have exited already.
        let _ = tx.send(AppEvent::Validated { ticket, outcome });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::oracle::WordListOracle;
    use assert_matches::assert_matches;

    struct BrokenOracle;

    impl WordOracle for BrokenOracle {
        fn daily_word(&self, word_length: usize) -> Result<String, OracleError> {
            Err(OracleError::NoWords(word_length))
        }

        fn check_word(&self, _word: &str) -> Result<bool, OracleError> {
            Err(OracleError::Network("connection refused".into()))
        }
    }

    fn runner() -> Runner<TestEventSource, FixedTicker> {
        Runner::new(TestEventSource::new(), FixedTicker::new(Duration::from_millis(10)))
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let runner = Runner::new(TestEventSource::new(), FixedTicker::new(Duration::from_millis(1)));
        assert_matches!(runner.step(), AppEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let runner = runner();
        runner.sender().send(AppEvent::Resize).unwrap();
        assert_matches!(runner.step(), AppEvent::Resize);
    }

    fn wait_for_validation(runner: &Runner<TestEventSource, FixedTicker>) -> (Ticket, Validation) {
        for _ in 0..500 {
            if let AppEvent::Validated { ticket, outcome } = runner.step() {
                return (ticket, outcome);
            }
        }
        panic!("validation never arrived");
    }

    #[test]
    fn validation_reports_known_and_unknown_words() {
        let runner = runner();
        let oracle: Arc<dyn WordOracle> = Arc::new(WordListOracle::new(["MANGO", "MONEY"]));

        spawn_validation(oracle.clone(), 7, "MANGO".into(), runner.sender());
        assert_eq!(wait_for_validation(&runner), (7, Validation::Accepted));

        spawn_validation(oracle, 8, "XXXXX".into(), runner.sender());
        assert_eq!(wait_for_validation(&runner), (8, Validation::Rejected));
    }

    #[test]
    fn validation_maps_oracle_failures() {
        let runner = runner();
        spawn_validation(Arc::new(BrokenOracle), 3, "MANGO".into(), runner.sender());
        let (ticket, outcome) = wait_for_validation(&runner);
        assert_eq!(ticket, 3);
        assert_matches!(outcome, Validation::NetworkError(msg) if msg.contains("connection refused"));
    }
}
