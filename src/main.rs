pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use motle::{
    app_dirs::AppDirs,
    celebration::Celebration,
    config::{Config, ConfigStore, FileConfigStore},
    error::OracleError,
    game::{Effect, Game, GameEvent},
    history::{export_csv, GameRecord, HistorySummary},
    logging,
    oracle::{HttpOracle, WordListOracle, WordOracle},
    persist::Persister,
    runtime::{spawn_validation, AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    session::SessionConfig,
    store::{GameStore, HistorySubscription, SqliteStore},
    user::{FileIdentityStore, IdentityStore, User},
    util::{format_date_time, format_hms},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    sync::{mpsc::Sender, Arc},
    time::{Duration, Instant},
};
use tracing::{error, info, warn};

const TICK_RATE_MS: u64 = 100;

/// daily word-guessing game for the terminal
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "Guess the hidden word in a limited number of tries before the clock runs out. Games are saved as you play and kept in a local history."
)]
pub struct Cli {
    /// letters per word
    #[clap(short = 'l', long)]
    word_length: Option<usize>,

    /// number of guesses allowed
    #[clap(short = 'a', long)]
    max_attempts: Option<usize>,

    /// seconds on the clock
    #[clap(short = 't', long)]
    time_limit: Option<u64>,

    /// base URL of a word service providing /api/new-game and /api/check-word
    #[clap(long)]
    oracle_url: Option<String>,

    /// newline-separated word file to play offline with
    #[clap(long)]
    word_list: Option<PathBuf>,

    /// print past games and exit
    #[clap(long)]
    history: bool,

    /// throw away the saved game and start a new one
    #[clap(long)]
    new: bool,

    /// write past games to a CSV file and exit
    #[clap(long, value_name = "PATH")]
    export: Option<PathBuf>,
}

impl Cli {
    /// Layer command-line settings over the saved config. Returns whether anything changed.
    fn apply(&self, config: &mut Config) -> bool {
        let before = config.clone();
        if let Some(n) = self.word_length {
            config.word_length = n;
        }
        if let Some(n) = self.max_attempts {
            config.max_attempts = n;
        }
        if let Some(secs) = self.time_limit {
            config.time_limit_secs = secs;
        }
        if let Some(url) = &self.oracle_url {
            config.oracle_url = Some(url.clone());
        }
        if let Some(path) = &self.word_list {
            config.word_list = Some(path.clone());
        }
        *config != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Playing,
    Results,
    History,
}

#[derive(Debug, Default)]
pub struct HistoryView {
    pub records: Vec<GameRecord>,
    pub summary: HistorySummary,
    pub scroll_offset: usize,
}

impl HistoryView {
    fn replace(&mut self, records: Vec<GameRecord>) {
        self.summary = HistorySummary::from_records(&records);
        self.records = records;
        self.scroll_offset = self.scroll_offset.min(self.records.len().saturating_sub(1));
    }

    fn scroll(&mut self, delta: isize) {
        let max = self.records.len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max);
    }
}

#[derive(Debug)]
pub struct App {
    pub game: Game,
    pub state: AppState,
    pub username: String,
    pub history: HistoryView,
    pub celebration: Celebration,
    /// Shown on the results screen when a new game could not be started.
    pub error: Option<String>,
    last_tick: Instant,
}

impl App {
    pub fn new(game: Game, username: String) -> Self {
        let state = if game.is_game_over() {
            AppState::Results
        } else {
            AppState::Playing
        };
        Self {
            game,
            state,
            username,
            history: HistoryView::default(),
            celebration: Celebration::new(),
            error: None,
            last_tick: Instant::now(),
        }
    }

    fn board_state(&self) -> AppState {
        if self.game.is_game_over() {
            AppState::Results
        } else {
            AppState::Playing
        }
    }

    /// Feed one event to the game and hand its effects to the services.
    fn run(&mut self, event: GameEvent, services: &Services, area: (u16, u16)) {
        let was_over = self.game.is_game_over();
        match self.game.dispatch(event) {
            Ok(effects) => services.apply(effects),
            Err(err) => error!(%err, "game transition failed"),
        }
        if !was_over && self.game.is_game_over() {
            if self.state == AppState::Playing {
                self.state = AppState::Results;
            }
            if self.game.result().is_win() {
                let used = self.game.session().attempts().len();
                self.celebration.start(area.0, area.1, used);
            }
        }
    }

    fn tick(&mut self, services: &Services, area: (u16, u16)) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.run(GameEvent::Tick(elapsed), services, area);
        self.celebration.update();
    }

    /// Bring the clock up to date and leave a snapshot behind for the next start.
    fn save_on_exit(&mut self, services: &Services, area: (u16, u16)) {
        self.tick(services, area);
        if !self.game.is_game_over() {
            services.persister.submit(&Effect::Save(self.game.snapshot()));
        }
    }

    fn new_game(&mut self, services: &Services) {
        let started = services
            .oracle
            .daily_word(services.settings.word_length)
            .map_err(|e| e.to_string())
            .and_then(|word| Game::new(&word, &services.settings).map_err(|e| e.to_string()));

        match started {
            Ok(game) => {
                services.persister.submit(&Effect::Clear);
                self.game = game;
                self.state = AppState::Playing;
                self.celebration = Celebration::new();
                self.error = None;
                self.last_tick = Instant::now();
            }
            Err(err) => {
                warn!(%err, "could not start a new game");
                self.error = Some(err);
            }
        }
    }
}

/// Everything the front end needs to carry out effects.
pub struct Services {
    pub oracle: Arc<dyn WordOracle>,
    pub persister: Persister,
    pub events: Sender<AppEvent>,
    pub settings: SessionConfig,
}

impl Services {
    fn apply(&self, effects: Vec<Effect>) {
        self.persister.submit_all(&effects);
        for effect in effects {
            if let Effect::Validate { ticket, word } = effect {
                spawn_validation(self.oracle.clone(), ticket, word, self.events.clone());
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_path = AppDirs::log_path().unwrap_or_else(|| PathBuf::from("motle.log"));
    logging::init_file_logging(&log_path)?;

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if cli.apply(&mut config) {
        if let Err(err) = config_store.save(&config) {
            warn!(%err, "could not save config");
        }
    }
    let settings = SessionConfig::from(&config);

    let user = FileIdentityStore::new().load_or_create();
    let mut store = SqliteStore::open_default()?;

    if let Some(path) = &cli.export {
        let records = store.fetch_history(&user.id)?;
        export_csv(&records, File::create(path)?)?;
        println!("exported {} games to {}", records.len(), path.display());
        return Ok(());
    }

    if cli.history {
        print_history(&store.fetch_history(&user.id)?);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let oracle = build_oracle(&config)?;
    let game = resume_or_start(&mut store, &user, oracle.as_ref(), &settings, cli.new)?;
    let history = store.subscribe_history(&user.id)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let services = Services {
        oracle,
        persister: Persister::spawn(Box::new(store), user.clone()),
        events: runner.sender(),
        settings,
    };
    let mut app = App::new(game, user.username.clone());

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, &services, &runner, &history);
    let size = terminal.size().unwrap_or_default();
    app.save_on_exit(&services, (size.width, size.height));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    drop(history);
    if services.persister.finish().is_none() {
        warn!("persistence worker did not shut down cleanly");
    }
    info!("bye");

    outcome
}

fn build_oracle(config: &Config) -> Result<Arc<dyn WordOracle>, OracleError> {
    match (&config.oracle_url, &config.word_list) {
        (Some(url), _) => Ok(Arc::new(HttpOracle::new(url.clone())?)),
        (None, Some(path)) => Ok(Arc::new(WordListOracle::from_file(path)?)),
        (None, None) => Ok(Arc::new(WordListOracle::embedded(config.word_length)?)),
    }
}

/// Continue the saved game if it is still running, otherwise fetch a word and start fresh.
/// A failed word fetch is returned, never papered over.
fn resume_or_start<S: GameStore>(
    store: &mut S,
    user: &User,
    oracle: &dyn WordOracle,
    settings: &SessionConfig,
    fresh: bool,
) -> Result<Game, Box<dyn Error>> {
    match store.load_session(&user.id) {
        Ok(Some(snapshot)) if !fresh && !snapshot.is_game_over => {
            match Game::restore(snapshot, settings) {
                Ok(game) => return Ok(game),
                Err(err) => warn!(%err, "saved game is unusable; starting over"),
            }
        }
        Ok(_) => {}
        Err(err) => warn!(%err, "could not load saved game"),
    }

    let word = oracle.daily_word(settings.word_length)?;
    let game = Game::new(&word, settings)?;
    if let Err(err) = store.clear_session(&user.id) {
        warn!(%err, "could not clear saved game");
    }
    Ok(game)
}

fn print_history(records: &[GameRecord]) {
    if records.is_empty() {
        println!("no games played yet");
        return;
    }
    for record in records {
        println!(
            "{:<16}  {:<8}  {:<13}  {:>3} pts  {}  {}",
            format_date_time(record.date.as_ref()),
            record.word,
            record.result,
            record.points,
            format_hms(record.time),
            record.attempts.len(),
        );
    }
    let summary = HistorySummary::from_records(records);
    println!(
        "\nplayed {}  won {}  win rate {}%",
        summary.played, summary.won, summary.win_rate
    );
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    services: &Services,
    runner: &Runner<E, T>,
    history: &HistorySubscription,
) -> Result<(), Box<dyn Error>> {
    let interval = runner.tick_interval();
    terminal.draw(|f| ui(app, f))?;

    loop {
        let size = terminal.size().unwrap_or_default();
        let area = (size.width, size.height);

        let event = runner.step();
        let is_tick = matches!(event, AppEvent::Tick);
        if handle_event(app, event, services, area) == Flow::Quit {
            break;
        }
        // Keep the clock honest while keys are arriving faster than the tick rate.
        if !is_tick && app.last_tick.elapsed() >= interval {
            app.tick(services, area);
        }

        if let Some(records) = history.latest() {
            app.history.replace(records);
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn handle_event(app: &mut App, event: AppEvent, services: &Services, area: (u16, u16)) -> Flow {
    match event {
        AppEvent::Tick => app.tick(services, area),
        AppEvent::Resize => {}
        AppEvent::Validated { ticket, outcome } => {
            app.run(GameEvent::ValidationResolved { ticket, outcome }, services, area)
        }
        AppEvent::Key(key) => return handle_key(app, key, services, area),
    }
    Flow::Continue
}

fn handle_key(app: &mut App, key: KeyEvent, services: &Services, area: (u16, u16)) -> Flow {
    if key.kind != KeyEventKind::Press {
        return Flow::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    match app.state {
        AppState::Playing => match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Enter => app.run(GameEvent::Submit, services, area),
            KeyCode::Backspace => app.run(GameEvent::Backspace, services, area),
            KeyCode::Tab => app.state = AppState::History,
            KeyCode::Char('p') if ctrl => {
                let event = if app.game.is_paused() {
                    GameEvent::Resume
                } else {
                    GameEvent::Pause
                };
                app.run(event, services, area);
            }
            KeyCode::Char('a') if ctrl => app.run(GameEvent::Abandon, services, area),
            KeyCode::Char(c) if !ctrl => app.run(GameEvent::Letter(c), services, area),
            _ => {}
        },
        AppState::Results => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char('n') => app.new_game(services),
            KeyCode::Char('h') | KeyCode::Tab => app.state = AppState::History,
            _ => {}
        },
        AppState::History => match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Esc | KeyCode::Tab | KeyCode::Backspace | KeyCode::Char('b') => {
                app.state = app.board_state();
            }
            KeyCode::Up => app.history.scroll(-1),
            KeyCode::Down => app.history.scroll(1),
            KeyCode::PageUp => app.history.scroll(-10),
            KeyCode::PageDown => app.history.scroll(10),
            KeyCode::Home => app.history.scroll_offset = 0,
            _ => {}
        },
    }
    Flow::Continue
}

fn ui(app: &mut App, f: &mut Frame) {
    ui::screen::current_screen(&app.state).render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use motle::{grid::CellStatus, runtime::TestEventSource, session::GameResult, store::MemoryStore};
    use ratatui::backend::TestBackend;

    const AREA: (u16, u16) = (80, 24);

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn settings() -> SessionConfig {
        SessionConfig {
            time_limit: Duration::from_secs(120),
            ..SessionConfig::default()
        }
    }

    struct Harness {
        app: App,
        services: Services,
        runner: Runner<TestEventSource, FixedTicker>,
    }

    impl Harness {
        fn new() -> Self {
            let runner = Runner::new(TestEventSource::new(), FixedTicker::new(Duration::from_millis(5)));
            let oracle: Arc<dyn WordOracle> =
                Arc::new(WordListOracle::new(["MANGO", "MONEY", "MAGIC"]));
            let word = oracle.daily_word(5).unwrap();
            let services = Services {
                oracle,
                persister: Persister::spawn(Box::new(MemoryStore::new()), user()),
                events: runner.sender(),
                settings: settings(),
            };
            let game = Game::new(&word, &services.settings).unwrap();
            Self {
                app: App::new(game, "User_test".into()),
                services,
                runner,
            }
        }

        fn press(&mut self, event: KeyEvent) -> Flow {
            handle_key(&mut self.app, event, &self.services, AREA)
        }

        fn type_word(&mut self, word: &str) {
            for c in word.chars() {
                self.press(key(KeyCode::Char(c)));
            }
        }

        /// Pump events until the outstanding validation has been applied.
        fn settle(&mut self) {
            for _ in 0..1000 {
                if !self.app.game.is_validating() {
                    return;
                }
                let event = self.runner.step();
                handle_event(&mut self.app, event, &self.services, AREA);
            }
            panic!("validation never resolved");
        }
    }

    fn user() -> User {
        User {
            id: "u1".into(),
            username: "User_test".into(),
        }
    }

    #[test]
    fn test_cli_defaults_leave_config_alone() {
        let cli = Cli::parse_from(["motle"]);
        let mut config = Config::default();
        assert!(!cli.apply(&mut config));
        assert_eq!(config, Config::default());
        assert!(!cli.history);
        assert!(!cli.new);
        assert_eq!(cli.export, None);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "motle",
            "--word-length",
            "6",
            "-a",
            "4",
            "--time-limit",
            "90",
            "--oracle-url",
            "http://localhost:3000",
        ]);
        let mut config = Config::default();
        assert!(cli.apply(&mut config));
        assert_eq!(config.word_length, 6);
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.time_limit_secs, 90);
        assert_eq!(config.oracle_url.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["motle", "--new", "--history", "--export", "out.csv"]);
        assert!(cli.new);
        assert!(cli.history);
        assert_eq!(cli.export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_build_oracle_defaults_to_bundled_list() {
        let oracle = build_oracle(&Config::default()).unwrap();
        let word = oracle.daily_word(5).unwrap();
        assert_eq!(word.len(), 5);
        assert!(oracle.check_word(&word).unwrap());
    }

    #[test]
    fn test_build_oracle_unknown_length_fails() {
        let config = Config {
            word_length: 17,
            ..Config::default()
        };
        assert!(build_oracle(&config).is_err());
    }

    #[test]
    fn test_resume_or_start_restores_running_game() {
        let oracle = WordListOracle::new(["MANGO"]);
        let mut store = MemoryStore::new();
        let mut game = Game::new("MANGO", &settings()).unwrap();
        game.dispatch(GameEvent::Letter('M')).unwrap();
        store.save_session("u1", &game.snapshot()).unwrap();

        let resumed = resume_or_start(&mut store, &user(), &oracle, &settings(), false).unwrap();
        assert_eq!(resumed.snapshot(), game.snapshot());
    }

    #[test]
    fn test_resume_or_start_discards_finished_or_forced() {
        let oracle = WordListOracle::new(["MANGO"]);
        let mut store = MemoryStore::new();
        let mut game = Game::new("MANGO", &settings()).unwrap();
        game.dispatch(GameEvent::Letter('M')).unwrap();
        store.save_session("u1", &game.snapshot()).unwrap();

        let fresh = resume_or_start(&mut store, &user(), &oracle, &settings(), true).unwrap();
        assert!(fresh.session().attempts().is_empty());
        assert_eq!(fresh.grid().get(1, 1).unwrap().status, CellStatus::Empty);
        assert!(store.load_session("u1").unwrap().is_none());

        game.dispatch(GameEvent::TimerExpired).unwrap();
        store.save_session("u1", &game.snapshot()).unwrap();
        let next = resume_or_start(&mut store, &user(), &oracle, &settings(), false).unwrap();
        assert!(!next.is_game_over());
    }

    #[test]
    fn test_resume_or_start_surfaces_word_failure() {
        let oracle = WordListOracle::new(["MANGO"]);
        let mut store = MemoryStore::new();
        let six = SessionConfig {
            word_length: 6,
            ..settings()
        };
        assert!(resume_or_start(&mut store, &user(), &oracle, &six, false).is_err());
    }

    #[test]
    fn test_resume_or_start_keeps_saved_game_when_word_fails() {
        let oracle = WordListOracle::new(["MANGOS"]);
        let mut store = MemoryStore::new();
        let mut game = Game::new("MANGO", &settings()).unwrap();
        game.dispatch(GameEvent::Letter('M')).unwrap();
        store.save_session("u1", &game.snapshot()).unwrap();

        assert!(resume_or_start(&mut store, &user(), &oracle, &settings(), true).is_err());
        assert_eq!(store.load_session("u1").unwrap(), Some(game.snapshot()));
    }

    #[test]
    fn test_quit_saves_time_spent_since_last_key() {
        let mut h = Harness::new();
        h.press(key(KeyCode::Char('m')));
        h.app.run(GameEvent::Tick(Duration::from_millis(90_400)), &h.services, AREA);
        assert_eq!(h.press(key(KeyCode::Esc)), Flow::Quit);
        h.app.save_on_exit(&h.services, AREA);

        let live = h.app.game.snapshot();
        let Harness { services, .. } = h;
        let store = services.persister.finish().unwrap();
        let saved = store.load_session("u1").unwrap().unwrap();
        assert_eq!(saved, live);
        assert!(saved.elapsed_time >= Duration::from_millis(90_400));

        let restored = Game::restore(saved, &settings()).unwrap();
        assert!(restored.remaining() <= Duration::from_millis(29_600));
    }

    #[test]
    fn test_keys_drive_a_winning_game() {
        let mut h = Harness::new();
        let target = h.app.game.session().target_word().to_string();

        h.type_word(&target.to_lowercase());
        h.press(key(KeyCode::Enter));
        assert!(h.app.game.is_validating());
        h.settle();

        assert_eq!(h.app.game.result(), GameResult::Win);
        assert_eq!(h.app.state, AppState::Results);
        assert!(h.app.celebration.is_active());
    }

    #[test]
    fn test_rejected_word_keeps_row() {
        let mut h = Harness::new();
        h.type_word("ZZZZZ");
        h.press(key(KeyCode::Enter));
        h.settle();

        assert_eq!(h.app.state, AppState::Playing);
        assert!(h.app.game.session().attempts().is_empty());
        assert_eq!(h.app.game.grid().row_word(1).unwrap(), "ZZZZZ");
        assert!(h.app.game.info_message(Instant::now()).is_some());
    }

    #[test]
    fn test_late_validation_after_abandon_is_ignored() {
        let mut h = Harness::new();
        h.type_word("MONEY");
        h.press(key(KeyCode::Enter));
        h.press(ctrl('a'));
        assert!(h.app.game.is_game_over());
        assert_eq!(h.app.state, AppState::Results);

        let grid = h.app.game.grid().clone();
        for _ in 0..20 {
            let event = h.runner.step();
            handle_event(&mut h.app, event, &h.services, AREA);
        }
        assert_eq!(h.app.game.grid(), &grid);
        assert_eq!(h.app.game.result(), GameResult::LossAttempts);
    }

    #[test]
    fn test_pause_toggles_and_blocks_letters() {
        let mut h = Harness::new();
        h.press(ctrl('p'));
        assert!(h.app.game.is_paused());
        h.press(key(KeyCode::Char('m')));
        assert_eq!(h.app.game.cursor().column, 1);
        h.press(ctrl('p'));
        assert!(!h.app.game.is_paused());
    }

    #[test]
    fn test_new_game_after_loss() {
        let mut h = Harness::new();
        h.press(ctrl('a'));
        assert_eq!(h.app.state, AppState::Results);
        h.press(key(KeyCode::Char('n')));
        assert_eq!(h.app.state, AppState::Playing);
        assert!(!h.app.game.is_game_over());
        assert!(h.app.error.is_none());
    }

    #[test]
    fn test_history_screen_navigation() {
        let mut h = Harness::new();
        h.press(key(KeyCode::Tab));
        assert_eq!(h.app.state, AppState::History);
        h.press(key(KeyCode::Down));
        assert_eq!(h.app.history.scroll_offset, 0);
        h.press(key(KeyCode::Esc));
        assert_eq!(h.app.state, AppState::Playing);
    }

    #[test]
    fn test_quit_keys() {
        let mut h = Harness::new();
        assert_eq!(h.press(ctrl('c')), Flow::Quit);
        assert_eq!(h.press(key(KeyCode::Esc)), Flow::Quit);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut h = Harness::new();
        let release = KeyEvent {
            code: KeyCode::Char('m'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        h.press(release);
        assert_eq!(h.app.game.cursor().column, 1);
    }

    #[test]
    fn test_ui_renders_each_state() {
        let mut h = Harness::new();
        h.type_word("MON");
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        for state in [AppState::Playing, AppState::Results, AppState::History] {
            h.app.state = state;
            terminal.draw(|f| ui(&mut h.app, f)).unwrap();
            let content: String = terminal
                .backend()
                .buffer()
                .content
                .iter()
                .map(|c| c.symbol())
                .collect();
            assert!(!content.trim().is_empty());
        }
    }

    #[test]
    fn test_tick_rate_constant() {
        assert_eq!(TICK_RATE_MS, 100);
    }

    #[test]
    fn test_history_view_scroll_is_clamped() {
        let mut view = HistoryView::default();
        let record = GameRecord {
            id: Some(1),
            username: "User_test".into(),
            word: "MANGO".into(),
            attempts: vec![],
            points: 0,
            result: GameResult::LossTimeout,
            time: 600,
            date: None,
        };
        view.replace(vec![record.clone(), record.clone(), record]);
        view.scroll(10);
        assert_eq!(view.scroll_offset, 2);
        view.scroll(-1);
        assert_eq!(view.scroll_offset, 1);
        view.scroll(-10);
        assert_eq!(view.scroll_offset, 0);
        assert_eq!(view.summary.played, 3);
    }
}
