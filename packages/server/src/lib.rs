// Mod Registry - API Core
//
// Moderation and catalog reconciliation for a mod package registry.
// Domain actions live in domains/*/actions and take their infrastructure
// from kernel::ServerDeps.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
