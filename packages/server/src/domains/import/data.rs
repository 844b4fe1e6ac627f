//! Import data types

use catalog_client::DependencyRef;
use serde::Serialize;
use thiserror::Error;

use crate::common::ModVersionId;

pub const DEFAULT_GAME_NAME: &str = "Beat Saber";
pub const DEFAULT_GAME_VERSION: &str = "1.39.0";

/// Settings applied to every catalog import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Game every imported mod and game version belongs to
    pub game_name: String,
    /// Game version requested from the catalog
    pub game_version: String,
    /// When false, archives are not fetched and a placeholder hash is stored
    pub download_artifacts: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            game_name: DEFAULT_GAME_NAME.to_string(),
            game_version: DEFAULT_GAME_VERSION.to_string(),
            download_artifacts: false,
        }
    }
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub descriptors: usize,
    pub declined: usize,
    pub mods_created: usize,
    pub versions_created: usize,
    pub duplicates: usize,
    /// Download entries skipped because the package version did not coerce
    pub unparseable: usize,
    pub failures: Vec<ImportFailure>,
    pub dependencies_linked: usize,
    pub dependencies_dropped: usize,
}

/// A descriptor download that could not be imported
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub name: String,
    pub version: String,
    pub reason: String,
}

/// Recoverable failure of a single download entry. The batch carries on.
#[derive(Error, Debug)]
pub enum ImportItemError {
    #[error("Failed to download {url}: {cause}")]
    Download {
        url: String,
        #[source]
        cause: anyhow::Error,
    },

    #[error("Failed to store artifact {hash}: {cause}")]
    Persist {
        hash: String,
        #[source]
        cause: anyhow::Error,
    },
}

/// A dependency reference waiting to be linked onto `dependent`
#[derive(Debug, Clone)]
pub struct DependencyWork {
    pub dependent: ModVersionId,
    pub reference: DependencyRef,
    /// 1 for references of batch descriptors, 2 for references of packages
    /// materialised while resolving
    pub depth: u8,
}
