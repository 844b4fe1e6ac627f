//! Import domain - reconciles the external mod catalog into the registry
//!
//! Responsibilities:
//! - Creating mods, game versions and mod versions from catalog entries
//! - Hashing and storing downloaded archives
//! - Linking dependency references between imported versions

pub mod actions;
pub mod data;

pub use actions::*;
pub use data::*;
