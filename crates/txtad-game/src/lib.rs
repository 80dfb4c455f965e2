//! Game runtime for txtad.
//!
//! A game directory (`settings.json` plus `game_files/**`) is loaded into
//! [`Content`], instantiated into live contexts and texts, and played by
//! [`User`]s. Each user owns a context stack topped off by a private
//! mechanics context whose handlers implement the built-in `#` commands.
//! [`Game::handle_event`] runs one turn and returns everything printed.

/// Settings and runtime configuration.
pub mod config;
/// Serialized content and its loader.
pub mod content;
/// Error types for the game layer.
pub mod error;
/// Game instance and turn handling.
pub mod game;
mod mechanics;
/// Printable texts.
pub mod text;
/// Players and their view of the world.
pub mod user;

pub use config::{GameConfig, Settings};
pub use content::{Content, ContextSpec, ListenerSpec, Objects, TextSpec, UseCtxSpec};
pub use error::{GameError, GameResult};
pub use game::{Game, Message, MessageBody, NEW_CONNECTION};
pub use text::{SharedText, Text};
pub use user::{Outgoing, Recipient, Request, User};
