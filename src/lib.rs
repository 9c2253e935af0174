// Library surface for headless/integration tests and reuse.
// Terminal drawing stays in the binary.
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod game;
pub mod grid;
pub mod history;
pub mod logging;
pub mod oracle;
pub mod persist;
pub mod runtime;
pub mod session;
pub mod store;
pub mod timer;
pub mod user;
pub mod util;
