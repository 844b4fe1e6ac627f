use serde::{Deserialize, Serialize};

/// A single mod entry as published by the catalog's `/api/v1/mod` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMod {
    pub name: String,
    pub version: String,
    #[serde(rename = "gameVersion", default)]
    pub game_version: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub downloads: Vec<CatalogDownload>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
}

/// One platform-specific archive of a catalog mod.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDownload {
    /// `steam`, `oculus` or `universal`
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(rename = "hashMd5", default)]
    pub hash_md5: Vec<FileHash>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileHash {
    pub hash: String,
    pub file: String,
}

/// Reference from one catalog mod to another.
///
/// The catalog inlines the full dependency entry when it pins a version and
/// only names the dependency otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyRef {
    Exact(Box<CatalogMod>),
    Named { name: String },
    Bare(String),
}

impl DependencyRef {
    pub fn name(&self) -> &str {
        match self {
            DependencyRef::Exact(m) => &m.name,
            DependencyRef::Named { name } => name,
            DependencyRef::Bare(name) => name,
        }
    }

    /// The pinned dependency entry, if this reference names an exact version.
    pub fn exact(&self) -> Option<&CatalogMod> {
        match self {
            DependencyRef::Exact(m) => Some(m),
            _ => None,
        }
    }
}
