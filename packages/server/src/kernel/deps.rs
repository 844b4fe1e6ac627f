//! Server dependencies for actions (using traits for testability)
//!
//! This module provides the central dependency container used by every
//! domain action. External services sit behind trait abstractions so tests
//! can swap in the in-memory versions from `test_dependencies`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use catalog_client::{CatalogClient, CatalogMod};
use std::path::PathBuf;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::domains::import::ImportOptions;
use crate::kernel::{BaseArtifactStore, BaseCatalogSource, BaseRegistryStore};

// =============================================================================
// CatalogClient Adapter (implements BaseCatalogSource trait)
// =============================================================================

/// Wrapper around CatalogClient that implements BaseCatalogSource trait
pub struct CatalogAdapter(pub Arc<CatalogClient>);

impl CatalogAdapter {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseCatalogSource for CatalogAdapter {
    async fn fetch_mods(&self, game_version: &str) -> Result<Vec<CatalogMod>> {
        self.0
            .fetch_mods(game_version)
            .await
            .map_err(anyhow::Error::from)
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.0
            .download(path)
            .await
            .map_err(anyhow::Error::from)
    }
}

// =============================================================================
// Filesystem artifact store
// =============================================================================

/// Stores archives as `<root>/<hash>.zip`
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, hash: &str) -> PathBuf {
        self.root.join(format!("{}.zip", hash))
    }
}

#[async_trait]
impl BaseArtifactStore for FsArtifactStore {
    async fn persist(&self, hash: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create {}", self.root.display()))?;

        let path = self.path_for(hash);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored artifact");
        Ok(())
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseRegistryStore>,
    pub catalog: Arc<dyn BaseCatalogSource>,
    pub artifacts: Arc<dyn BaseArtifactStore>,
    /// JWT service for token verification
    pub jwt_service: Arc<JwtService>,
    /// Game and download settings applied by catalog imports
    pub import_options: ImportOptions,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseRegistryStore>,
        catalog: Arc<dyn BaseCatalogSource>,
        artifacts: Arc<dyn BaseArtifactStore>,
        jwt_service: Arc<JwtService>,
        import_options: ImportOptions,
    ) -> Self {
        Self {
            store,
            catalog,
            artifacts,
            jwt_service,
            import_options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_client::CatalogError;

    #[test]
    fn test_artifact_path_uses_hash() {
        let store = FsArtifactStore::new("/tmp/uploads");
        assert_eq!(
            store.path_for("abc123"),
            PathBuf::from("/tmp/uploads/abc123.zip")
        );
    }

    #[tokio::test]
    async fn test_catalog_errors_keep_their_type_and_source() {
        // Nothing listens on port 1, so the request fails before any response
        let adapter = CatalogAdapter::new(Arc::new(CatalogClient::new(
            "http://127.0.0.1:1".to_string(),
        )));

        let err = adapter.fetch_mods("1.39.0").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::Http(_))
        ));
        assert!(err.chain().count() > 1);

        let err = adapter.download("/uploads/missing.zip").await.unwrap_err();
        assert!(err.downcast_ref::<CatalogError>().is_some());
    }

    #[tokio::test]
    async fn test_persist_writes_file() {
        let dir = std::env::temp_dir().join(format!("registry-artifacts-{}", std::process::id()));
        let store = FsArtifactStore::new(&dir);

        store.persist("deadbeef", b"zip bytes").await.unwrap();

        let written = tokio::fs::read(store.path_for("deadbeef")).await.unwrap();
        assert_eq!(written, b"zip bytes");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
