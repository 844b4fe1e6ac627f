// Shared enumerations used by every domain
//
// All of these are persisted as lowercase TEXT and travel over the API with
// the same spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::RegistryError;

// =============================================================================
// Visibility
// =============================================================================

/// Moderation state of a mod or mod version.
///
/// Entities are created `unverified`, become publicly listed when
/// `verified`, and are hidden (but retained) when `removed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Unverified,
    Verified,
    Removed,
}

impl Visibility {
    /// Whether read endpoints may expose an entity in this state.
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Unverified | Visibility::Verified)
    }

    /// Visibility assigned to an imported entry from its catalog status.
    pub fn from_catalog_status(status: &str) -> Self {
        match status {
            "approved" | "inactive" => Visibility::Verified,
            _ => Visibility::Unverified,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Unverified => write!(f, "unverified"),
            Visibility::Verified => write!(f, "verified"),
            Visibility::Removed => write!(f, "removed"),
        }
    }
}

impl FromStr for Visibility {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(Visibility::Unverified),
            "verified" => Ok(Visibility::Verified),
            "removed" => Ok(Visibility::Removed),
            _ => Err(RegistryError::validation(format!("Invalid status: {}", s))),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Core,
    Essential,
    Library,
    Cosmetic,
    Practice,
    Gameplay,
    StreamTools,
    Ui,
    Lighting,
    Tweaks,
    Multiplayer,
    Text,
    Editor,
    #[default]
    Other,
}

impl Category {
    /// Lowercases catalog input and falls back to `Other` when it is not a
    /// known category.
    pub fn from_catalog(raw: &str) -> Self {
        raw.to_lowercase().parse().unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Core => "core",
            Category::Essential => "essential",
            Category::Library => "library",
            Category::Cosmetic => "cosmetic",
            Category::Practice => "practice",
            Category::Gameplay => "gameplay",
            Category::StreamTools => "streamtools",
            Category::Ui => "ui",
            Category::Lighting => "lighting",
            Category::Tweaks => "tweaks",
            Category::Multiplayer => "multiplayer",
            Category::Text => "text",
            Category::Editor => "editor",
            Category::Other => "other",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Category {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Category::Core),
            "essential" => Ok(Category::Essential),
            "library" => Ok(Category::Library),
            "cosmetic" => Ok(Category::Cosmetic),
            "practice" => Ok(Category::Practice),
            "gameplay" => Ok(Category::Gameplay),
            "streamtools" => Ok(Category::StreamTools),
            "ui" => Ok(Category::Ui),
            "lighting" => Ok(Category::Lighting),
            "tweaks" => Ok(Category::Tweaks),
            "multiplayer" => Ok(Category::Multiplayer),
            "text" => Ok(Category::Text),
            "editor" => Ok(Category::Editor),
            "other" => Ok(Category::Other),
            _ => Err(RegistryError::validation(format!("Invalid category: {}", s))),
        }
    }
}

// =============================================================================
// Platform
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Platform {
    #[serde(rename = "steampc")]
    Steam,
    #[serde(rename = "oculuspc")]
    Oculus,
    #[serde(rename = "universalpc")]
    Universal,
}

impl Platform {
    /// Maps a catalog download `type` onto a platform.
    pub fn from_catalog_type(kind: &str) -> Option<Self> {
        match kind {
            "steam" => Some(Platform::Steam),
            "oculus" => Some(Platform::Oculus),
            "universal" => Some(Platform::Universal),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Steam => write!(f, "steampc"),
            Platform::Oculus => write!(f, "oculuspc"),
            Platform::Universal => write!(f, "universalpc"),
        }
    }
}

impl FromStr for Platform {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steampc" => Ok(Platform::Steam),
            "oculuspc" => Ok(Platform::Oculus),
            "universalpc" => Ok(Platform::Universal),
            _ => Err(RegistryError::validation(format!("Invalid platform: {}", s))),
        }
    }
}

// =============================================================================
// UserRole
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    AllPermissions,
    Admin,
    Approver,
    Moderator,
    Banned,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::AllPermissions => write!(f, "allpermissions"),
            UserRole::Admin => write!(f, "admin"),
            UserRole::Approver => write!(f, "approver"),
            UserRole::Moderator => write!(f, "moderator"),
            UserRole::Banned => write!(f, "banned"),
        }
    }
}

impl FromStr for UserRole {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allpermissions" => Ok(UserRole::AllPermissions),
            "admin" => Ok(UserRole::Admin),
            "approver" => Ok(UserRole::Approver),
            "moderator" => Ok(UserRole::Moderator),
            "banned" => Ok(UserRole::Banned),
            _ => Err(RegistryError::validation(format!("Invalid role: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_status_mapping() {
        assert_eq!(Visibility::from_catalog_status("approved"), Visibility::Verified);
        assert_eq!(Visibility::from_catalog_status("inactive"), Visibility::Verified);
        assert_eq!(Visibility::from_catalog_status("pending"), Visibility::Unverified);
        assert_eq!(Visibility::from_catalog_status(""), Visibility::Unverified);
    }

    #[test]
    fn test_only_removed_is_hidden() {
        assert!(Visibility::Unverified.is_public());
        assert!(Visibility::Verified.is_public());
        assert!(!Visibility::Removed.is_public());
    }

    #[test]
    fn test_category_from_catalog_lowercases() {
        assert_eq!(Category::from_catalog("Core"), Category::Core);
        assert_eq!(Category::from_catalog("LIGHTING"), Category::Lighting);
    }

    #[test]
    fn test_category_from_catalog_falls_back_to_other() {
        assert_eq!(Category::from_catalog("Practice / Training"), Category::Other);
        assert_eq!(Category::from_catalog("Libraries"), Category::Other);
    }

    #[test]
    fn test_platform_catalog_types() {
        assert_eq!(Platform::from_catalog_type("steam"), Some(Platform::Steam));
        assert_eq!(Platform::from_catalog_type("oculus"), Some(Platform::Oculus));
        assert_eq!(Platform::from_catalog_type("universal"), Some(Platform::Universal));
        assert_eq!(Platform::from_catalog_type("quest"), None);
    }

    #[test]
    fn test_display_matches_serde() {
        for platform in [Platform::Steam, Platform::Oculus, Platform::Universal] {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{}\"", platform));
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
        let json = serde_json::to_string(&Category::StreamTools).unwrap();
        assert_eq!(json, "\"streamtools\"");
        let json = serde_json::to_string(&UserRole::AllPermissions).unwrap();
        assert_eq!(json, "\"allpermissions\"");
    }

    #[test]
    fn test_invalid_status_is_validation_error() {
        let err = "approved".parse::<Visibility>().unwrap_err();
        assert!(matches!(err, RegistryError::Validation(msg) if msg.contains("approved")));
    }
}
