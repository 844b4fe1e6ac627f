//! Approval domain - reviewer decisions on submissions and queued edits
//!
//! Responsibilities:
//! - Moving mods and mod versions between visibility states
//! - Staging, amending and resolving edits to published entries
//! - Enforcing that nobody reviews a mod they author

pub mod actions;
pub mod models;

pub use actions::*;
pub use models::*;
