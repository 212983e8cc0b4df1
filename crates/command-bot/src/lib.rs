//! Nextcloud Talk bot answering user-defined chat commands.
//!
//! Moderators define commands with `!set` and remove them with `!unset`;
//! anyone may list them with `!command` and trigger them by keyword.

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod install;
pub mod listing;
pub mod parser;
pub mod permissions;
pub mod placeholders;
pub mod server;

pub use engine::{CommandEngine, OutboundAction};
pub use error::{AppError, AppResult};
