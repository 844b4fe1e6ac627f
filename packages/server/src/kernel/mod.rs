//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod postgres_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::{CatalogAdapter, FsArtifactStore, ServerDeps};
pub use postgres_store::PostgresRegistryStore;
pub use test_dependencies::{
    MemoryRegistryStore, MockArtifactStore, MockCatalogSource, TestDependencies,
};
pub use traits::*;
