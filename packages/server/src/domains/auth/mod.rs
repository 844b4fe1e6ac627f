//! Auth domain - bearer token issuing and verification
//!
//! Tokens identify a registry user. Capability checks happen in
//! `common::auth` against the user loaded from the store.

pub mod jwt;

pub use jwt::{Claims, JwtService};
