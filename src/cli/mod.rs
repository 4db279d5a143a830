//! # CLI Module
//!
//! Subcommands of the `moodmix` binary.
//!
//! - [`serve`] - starts the HTTP server with the full pipeline
//! - [`recommend`] - asks the language model for a recommendation and
//!   prints it, without touching Spotify
//! - [`history`] - shows the most recent playlists of a Spotify account
//!
//! Commands report through the console macros (`info!`, `success!`,
//! `warning!`, `error!`). Configuration problems are fatal: the command
//! prints the missing setting and exits.
//!
//! ```bash
//! moodmix serve
//! moodmix recommend "rainy sunday, slow and warm"
//! moodmix history my_spotify_user
//! ```

mod history;
mod recommend;
mod serve;

pub use history::history;
pub use recommend::recommend;
pub use serve::serve;
