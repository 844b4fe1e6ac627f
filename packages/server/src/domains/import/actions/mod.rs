//! Import actions - catalog reconciliation and dependency linking

pub mod dependencies;
pub mod reconcile;

pub use dependencies::{resolve_dependencies, MAX_RESOLUTION_DEPTH};
pub use reconcile::{
    ensure_import_user, fetch_catalog, import_catalog, reconcile_descriptors, DEFAULT_ICON,
    IMPORT_USERNAME, PLACEHOLDER_ZIP_HASH,
};
