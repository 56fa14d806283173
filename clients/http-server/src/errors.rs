use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use store::{consts::consts::InvalidEntityId, database::request_manager::RequestManagerError};
use thiserror::Error;

pub const FETCH_DATA_FAILED: &str = "failed to fetch data";
pub const FETCH_INFO_FAILED: &str = "failed to fetch info";

/// Body of every JSON error response
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Every way a route can fail, `ResponseError` maps each kind to its status and body
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("name or number is missing")]
    MissingField,

    #[error("malformatted id")]
    MalformedId(#[from] InvalidEntityId),

    /// Record rejected by the store's validation
    #[error("{0}")]
    Validation(String),

    /// Request body is not valid JSON or has the wrong shape
    #[error("{0}")]
    MalformedBody(String),

    #[error("not found")]
    NotFound,

    /// Store failure on a bulk read, the message is fixed per route
    #[error("{message}")]
    StoreFault {
        message: &'static str,
        source: RequestManagerError,
    },

    #[error("unhandled error: {0}")]
    Unclassified(String),
}

impl ApiError {
    pub fn store_fault(message: &'static str) -> impl FnOnce(RequestManagerError) -> ApiError {
        move |source| ApiError::StoreFault { message, source }
    }
}

impl From<RequestManagerError> for ApiError {
    fn from(err: RequestManagerError) -> Self {
        match err {
            RequestManagerError::Validation(message) => ApiError::Validation(message),
            other => ApiError::Unclassified(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField
            | ApiError::MalformedId(_)
            | ApiError::Validation(_)
            | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StoreFault { .. } | ApiError::Unclassified(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::NotFound => HttpResponse::NotFound().finish(),
            ApiError::StoreFault { message, source } => {
                log::error!("{}: {}", message, source);

                HttpResponse::InternalServerError().json(ErrorResponse::new(*message))
            }
            // Details stay in the server log
            ApiError::Unclassified(_) => {
                log::error!("{}", self);

                HttpResponse::InternalServerError().json(ErrorResponse::new("internal server error"))
            }
            _ => HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(error: ApiError) -> (StatusCode, String) {
        let response = error.error_response();
        let status = response.status();

        let bytes = to_bytes(response.into_body()).await.unwrap();

        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[actix_web::test]
    async fn malformed_id_maps_to_bad_request() {
        let (status, body) = body_of(ApiError::from(InvalidEntityId("1".to_string()))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"error":"malformatted id"}"#);
    }

    #[actix_web::test]
    async fn validation_message_is_passed_through() {
        let error = ApiError::from(RequestManagerError::Validation(
            "Person validation failed: name: name is required".to_string(),
        ));

        let (status, body) = body_of(error).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            r#"{"error":"Person validation failed: name: name is required"}"#
        );
    }

    #[actix_web::test]
    async fn not_found_has_empty_body() {
        let (status, body) = body_of(ApiError::NotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "");
    }

    #[actix_web::test]
    async fn store_fault_uses_fixed_message() {
        let error = ApiError::store_fault(FETCH_INFO_FAILED)(RequestManagerError::DatabaseDisconnected);

        let (status, body) = body_of(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"failed to fetch info"}"#);
    }

    #[actix_web::test]
    async fn unclassified_errors_do_not_leak_details() {
        let error = ApiError::from(RequestManagerError::Storage("disk full".to_string()));

        let (status, body) = body_of(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("disk full"));
    }
}
