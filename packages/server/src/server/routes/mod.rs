// HTTP routes
pub mod approval;
pub mod errors;
pub mod health;
pub mod import;

pub use approval::*;
pub use health::*;
pub use import::*;

use axum::extract::Extension;

use crate::common::{RegistryError, RegistryResult};
use crate::domains::users::models::User;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

/// Load the caller's account. Tokens for deleted users are rejected.
pub(crate) async fn current_user(
    state: &AppState,
    auth: Option<Extension<AuthUser>>,
) -> RegistryResult<User> {
    let Some(Extension(auth)) = auth else {
        return Err(RegistryError::Unauthorized);
    };

    state
        .deps
        .store
        .find_user(auth.user_id)
        .await?
        .ok_or(RegistryError::Unauthorized)
}
