// Business domains
pub mod approval;
pub mod auth;
pub mod import;
pub mod mods;
pub mod users;
