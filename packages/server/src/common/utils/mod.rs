pub mod content_hash;
pub mod version;

pub use content_hash::*;
pub use version::*;
