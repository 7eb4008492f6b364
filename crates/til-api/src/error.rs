//! HTTP error mapping for til-api.

use axum::{http::StatusCode, response::IntoResponse, Json};

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    Database(til_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<til_core::Error> for ApiError {
    fn from(err: til_core::Error) -> Self {
        match &err {
            til_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            til_core::Error::AcronymNotFound(id) => {
                ApiError::NotFound(format!("Acronym {} not found", id))
            }
            til_core::Error::CategoryNotFound(id) => {
                ApiError::NotFound(format!("Category {} not found", id))
            }
            til_core::Error::UserNotFound(id) => {
                ApiError::NotFound(format!("User {} not found", id))
            }
            til_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            til_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            til_core::Error::Forbidden(msg) => ApiError::Forbidden(msg.clone()),
            til_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    let friendly_msg = if msg.contains("users_username_key") {
                        "A user with this username already exists".to_string()
                    } else if msg.contains("users_email_key") {
                        "A user with this email already exists".to_string()
                    } else if msg.contains("categories_name_key") {
                        "A category with this name already exists".to_string()
                    } else {
                        msg
                    };
                    return ApiError::Conflict(friendly_msg);
                }
                if msg.contains("foreign key") {
                    return ApiError::BadRequest(msg);
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_maps_from_core_error() {
        let err: ApiError = til_core::Error::AcronymNotFound(Uuid::nil()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err: ApiError = til_core::Error::InvalidInput("nope".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_unauthorized_maps_through() {
        let err: ApiError = til_core::Error::Unauthorized("bad token".to_string()).into();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_duplicate_username_becomes_conflict() {
        let sqlx_err = sqlx::Error::Protocol(
            "duplicate key value violates unique constraint \"users_username_key\"".to_string(),
        );
        let err: ApiError = til_core::Error::Database(sqlx_err).into();
        match err {
            ApiError::Conflict(msg) => assert!(msg.contains("username")),
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }
}
