//! Reviewer endpoints under `/api/approval`

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::current_user;
use crate::common::{EditId, ModId, ModVersionId, RegistryError, Visibility};
use crate::domains::approval::{
    self, EditApproval, EditOutcome, EditPatch, ModChanges, ModVersionChanges, PendingSubmissions,
};
use crate::domains::mods::models::{Mod, ModVersion};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

/// Body of every status change request
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

impl StatusBody {
    fn visibility(&self) -> Result<Visibility, RegistryError> {
        self.status.parse()
    }
}

pub async fn list_pending_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<PendingSubmissions>, RegistryError> {
    let user = current_user(&state, auth).await?;
    let pending = approval::list_pending(&user, &state.deps).await?;
    Ok(Json(pending))
}

pub async fn list_pending_edits_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<EditApproval>>, RegistryError> {
    let user = current_user(&state, auth).await?;
    let edits = approval::list_pending_edits(&user, &state.deps).await?;
    Ok(Json(edits))
}

pub async fn set_mod_status_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<ModId>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Mod>, RegistryError> {
    let user = current_user(&state, auth).await?;
    let updated = approval::set_mod_visibility(id, body.visibility()?, &user, &state.deps).await?;
    Ok(Json(updated))
}

pub async fn set_mod_version_status_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<ModVersionId>,
    Json(body): Json<StatusBody>,
) -> Result<Json<ModVersion>, RegistryError> {
    let user = current_user(&state, auth).await?;
    let updated =
        approval::set_mod_version_visibility(id, body.visibility()?, &user, &state.deps).await?;
    Ok(Json(updated))
}

pub async fn resolve_edit_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<EditId>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Value>, RegistryError> {
    let user = current_user(&state, auth).await?;
    let outcome = approval::resolve_edit(id, body.visibility()?, &user, &state.deps).await?;

    let response = match outcome {
        EditOutcome::Merged(edit) => json!({ "message": "Edit applied", "edit": edit }),
        EditOutcome::Discarded => json!({ "message": "Edit rejected" }),
    };
    Ok(Json(response))
}

pub async fn amend_mod_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<ModId>,
    Json(changes): Json<ModChanges>,
) -> Result<Json<Mod>, RegistryError> {
    let user = current_user(&state, auth).await?;
    let updated = approval::amend_pending_mod(id, changes, &user, &state.deps).await?;
    Ok(Json(updated))
}

pub async fn amend_mod_version_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<ModVersionId>,
    Json(changes): Json<ModVersionChanges>,
) -> Result<Json<ModVersion>, RegistryError> {
    let user = current_user(&state, auth).await?;
    let updated = approval::amend_pending_mod_version(id, changes, &user, &state.deps).await?;
    Ok(Json(updated))
}

pub async fn amend_edit_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<EditId>,
    Json(patch): Json<EditPatch>,
) -> Result<Json<EditApproval>, RegistryError> {
    let user = current_user(&state, auth).await?;
    let edit = approval::amend_edit(id, patch, &user, &state.deps).await?;
    Ok(Json(edit))
}
