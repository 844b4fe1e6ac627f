use axum::{extract::Extension, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{error, info};

use super::current_user;
use crate::common::auth::{Actor, RegistryCapability};
use crate::common::RegistryError;
use crate::domains::import::{ensure_import_user, fetch_catalog, reconcile_descriptors};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

/// Start a full catalog import.
///
/// The catalog is fetched before answering so an unreachable catalog is
/// reported to the caller. Reconciliation then runs in the background.
pub async fn import_all_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<(StatusCode, Json<Value>), RegistryError> {
    let user = current_user(&state, auth).await?;
    Actor::new(&user)
        .can(RegistryCapability::ImportCatalog)
        .check()?;

    let descriptors = fetch_catalog(&state.deps).await?;
    let author = ensure_import_user(&state.deps).await?;
    let count = descriptors.len();

    info!(requested_by = %user.id, descriptors = count, "Catalog import accepted");

    let deps = state.deps.clone();
    tokio::spawn(async move {
        if let Err(e) = reconcile_descriptors(&descriptors, &author, &deps).await {
            error!(error = %e, "Catalog import aborted");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "Import started", "descriptors": count })),
    ))
}
