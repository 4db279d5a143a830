//! MoodMix library
//!
//! Backend that turns a free-text mood into a Spotify playlist. A language
//! model suggests a playlist name and three songs, the songs are resolved
//! against the Spotify catalog, and the playlist is created in the user's
//! account and recorded in a per-account search history.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the server
//! - `cli` - Command-line subcommands
//! - `config` - Configuration from environment variables and `.env` files
//! - `management` - Relational storage for sessions, credentials and history
//! - `normalize` - Turns language-model replies into structured values
//! - `openai` - Chat-completion client and the recommendation step
//! - `pipeline` - Description → playlist orchestration
//! - `server` - Router construction and the HTTP listener
//! - `spotify` - Spotify Web API and OAuth client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod normalize;
pub mod openai;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the outer edges of the application (CLI commands, server
/// startup) where failures are reported rather than matched on. Components
/// return their own error types.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Console line prefixed with a blue `o`, for progress and status output
/// of the CLI. Takes the same arguments as `println!`.
///
/// ```
/// info!("Asking the language model for songs...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Console line prefixed with a green `✓`.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and terminates the process with exit code 1.
///
/// Reserved for the CLI front-end where nothing sensible can continue,
/// e.g. a missing required setting. Library code returns errors instead.
///
/// ```
/// error!("Cannot open database: {}", err);
/// // not reached
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Console line prefixed with a yellow `!`, for recoverable problems the
/// user should notice.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
