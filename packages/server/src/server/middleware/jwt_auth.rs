use crate::common::UserId;
use crate::domains::auth::JwtService;
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

/// Authenticated user information from JWT
///
/// Only identifies the caller. Roles are loaded from the store by the
/// handlers so that role changes apply to existing tokens.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: String,
}

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser; handlers that need a user reject it.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(user_id = %user.user_id, "Authenticated user");
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        user_id: claims.user_id,
        username: claims.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_with_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let token = jwt_service
            .create_token(UserId::new(7), "reviewer".to_string())
            .unwrap();

        let request = axum::http::Request::builder()
            .header("authorization", format!("Bearer {}", token))
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service).unwrap();
        assert_eq!(auth_user.user_id, UserId::new(7));
        assert_eq!(auth_user.username, "reviewer");
    }

    #[test]
    fn test_extract_token_without_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let token = jwt_service
            .create_token(UserId::new(7), "reviewer".to_string())
            .unwrap();

        let request = axum::http::Request::builder()
            .header("authorization", token)
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert_eq!(auth_user.map(|u| u.user_id), Some(UserId::new(7)));
    }

    #[test]
    fn test_no_auth_header() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();

        assert!(extract_auth_user(&request, &jwt_service).is_none());
    }

    #[test]
    fn test_invalid_token() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let request = axum::http::Request::builder()
            .header("authorization", "Bearer invalid_token")
            .body(axum::body::Body::empty())
            .unwrap();

        assert!(extract_auth_user(&request, &jwt_service).is_none());
    }
}
