use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::common::RegistryError;

impl RegistryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::Forbidden(_) => StatusCode::FORBIDDEN,
            RegistryError::Unauthorized => StatusCode::UNAUTHORIZED,
            RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
            RegistryError::ConstraintViolation(_) => StatusCode::CONFLICT,
            RegistryError::ExternalSource(_) => StatusCode::BAD_GATEWAY,
            RegistryError::Integrity(_) | RegistryError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RegistryError::not_found("Mod 1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RegistryError::Forbidden("own mod".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            RegistryError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RegistryError::ConstraintViolation("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            RegistryError::ExternalSource("503".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            RegistryError::Integrity("row".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
