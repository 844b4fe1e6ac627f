//! Typed ID definitions for all registry entities.
//!
//! ```rust
//! use registry_core::common::{ModId, ModVersionId};
//!
//! let mod_id = ModId::new(1);
//! let version_id = ModVersionId::new(1);
//!
//! // Same raw value, incompatible types:
//! // let wrong: ModId = version_id;
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (submitters, reviewers, import author).
pub struct User;

/// Marker type for Mod entities.
pub struct Mod;

/// Marker type for ModVersion entities.
pub struct ModVersion;

/// Marker type for GameVersion entities.
pub struct GameVersion;

/// Marker type for EditApprovalQueue rows (pending edits).
pub struct EditApproval;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type UserId = Id<User>;

pub type ModId = Id<Mod>;

pub type ModVersionId = Id<ModVersion>;

pub type GameVersionId = Id<GameVersion>;

pub type EditId = Id<EditApproval>;
