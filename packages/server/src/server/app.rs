//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    amend_edit_handler, amend_mod_handler, amend_mod_version_handler, health_handler,
    import_all_handler, list_pending_edits_handler, list_pending_handler, resolve_edit_handler,
    set_mod_status_handler, set_mod_version_status_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps) -> Router {
    let jwt_service = deps.jwt_service.clone();
    let app_state = AppState {
        deps: Arc::new(deps),
    };

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let approval = Router::new()
        .route("/new", get(list_pending_handler))
        .route("/edits", get(list_pending_edits_handler))
        .route(
            "/mod/:id",
            post(set_mod_status_handler).patch(amend_mod_handler),
        )
        .route(
            "/modversion/:id",
            post(set_mod_version_status_handler).patch(amend_mod_version_handler),
        )
        .route(
            "/edit/:id",
            post(resolve_edit_handler).patch(amend_edit_handler),
        );

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/approval", approval)
        .route("/api/beatmods/importAll", post(import_all_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
