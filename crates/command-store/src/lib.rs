//! Per-conversation registry of user-defined chat commands.
//!
//! Definitions are unique on `(token, command)` and carry a usage
//! counter that is only ever incremented through the registry.

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::{CommandRegistry, CommandStore};
pub use types::*;
