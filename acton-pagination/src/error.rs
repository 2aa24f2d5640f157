//! Error types and HTTP response conversion

use thiserror::Error;

use crate::model::FieldKind;
use crate::query::QueryError;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, PaginationError>;

/// Errors raised while building or executing a paginated query
///
/// Unknown fields in filters, search or ordering are not errors; they are
/// skipped. Malformed cursor tokens are not errors either; they decode as
/// "no cursor".
#[derive(Debug, Error)]
pub enum PaginationError {
    /// A filter value could not be coerced to the field's declared kind
    #[error("Invalid format for field '{field}': {raw_value}. Expected type: {expected_type}")]
    TypeCoercion {
        /// Full filter key, e.g. `age__gte`
        field: String,
        /// Raw query-string value
        raw_value: String,
        /// Declared kind of the field
        expected_type: FieldKind,
    },

    /// The cursor ordering references a field the entity does not declare
    #[error("Ordering field '{field}' does not exist on the model")]
    MissingOrderingField {
        /// Offending field name
        field: String,
    },

    /// The query executor failed
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// The request URL could not be parsed
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl PaginationError {
    /// Create a missing ordering field error
    pub fn missing_ordering_field(field: impl Into<String>) -> Self {
        Self::MissingOrderingField {
            field: field.into(),
        }
    }

    /// Whether the error was caused by client input
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::TypeCoercion { .. } | Self::InvalidUrl(_))
    }
}

impl From<figment::Error> for PaginationError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

#[cfg(feature = "http")]
mod http {
    use std::fmt;

    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use serde::{Deserialize, Serialize};

    use super::PaginationError;

    /// Error response body
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        /// Error message
        pub error: String,

        /// Optional error code
        #[serde(skip_serializing_if = "Option::is_none")]
        pub code: Option<String>,

        /// HTTP status code
        pub status: u16,
    }

    impl ErrorResponse {
        /// Create error response with a code
        pub fn with_code(
            status: StatusCode,
            code: impl Into<String>,
            error: impl Into<String>,
        ) -> Self {
            Self {
                error: error.into(),
                code: Some(code.into()),
                status: status.as_u16(),
            }
        }
    }

    impl fmt::Display for ErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.error)
        }
    }

    impl IntoResponse for PaginationError {
        fn into_response(self) -> Response {
            let (status, code, message) = match &self {
                PaginationError::TypeCoercion { .. } => {
                    (StatusCode::BAD_REQUEST, "INVALID_FILTER_VALUE", self.to_string())
                }
                PaginationError::InvalidUrl(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_URL", self.to_string())
                }
                PaginationError::MissingOrderingField { field } => {
                    tracing::error!(field = %field, "cursor ordering field missing from model");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MISSING_ORDERING_FIELD",
                        "Pagination is misconfigured".to_string(),
                    )
                }
                PaginationError::Query(e) => {
                    tracing::error!(
                        operation = %e.operation,
                        kind = %e.kind,
                        retriable = e.is_retriable(),
                        "Query error: {}", e.message
                    );
                    if e.is_retriable() {
                        (
                            StatusCode::SERVICE_UNAVAILABLE,
                            "SERVICE_UNAVAILABLE",
                            "Service temporarily unavailable".to_string(),
                        )
                    } else {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "QUERY_ERROR",
                            "Query failed".to_string(),
                        )
                    }
                }
                PaginationError::Config(e) => {
                    tracing::error!("Configuration error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "CONFIG_ERROR",
                        "Configuration error".to_string(),
                    )
                }
            };

            (status, Json(ErrorResponse::with_code(status, code, message))).into_response()
        }
    }
}

#[cfg(feature = "http")]
pub use http::ErrorResponse;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryOperation;

    #[test]
    fn test_coercion_message() {
        let err = PaginationError::TypeCoercion {
            field: "age__gte".to_string(),
            raw_value: "abc".to_string(),
            expected_type: FieldKind::Integer,
        };
        assert_eq!(
            err.to_string(),
            "Invalid format for field 'age__gte': abc. Expected type: integer"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_missing_ordering_field() {
        let err = PaginationError::missing_ordering_field("rank");
        assert_eq!(err.to_string(), "Ordering field 'rank' does not exist on the model");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_query_error_is_transparent() {
        let inner = QueryError::timeout(QueryOperation::Fetch, "slow");
        let err: PaginationError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
    }

    #[test]
    fn test_invalid_url_from() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: PaginationError = parse_err.into();
        assert!(matches!(err, PaginationError::InvalidUrl(_)));
    }

    #[cfg(feature = "http")]
    mod http_tests {
        use super::*;
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        async fn body_json(err: PaginationError) -> (StatusCode, serde_json::Value) {
            let response = err.into_response();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        #[tokio::test]
        async fn test_coercion_is_bad_request() {
            let (status, body) = body_json(PaginationError::TypeCoercion {
                field: "age".to_string(),
                raw_value: "abc".to_string(),
                expected_type: FieldKind::Integer,
            })
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "INVALID_FILTER_VALUE");
            assert_eq!(body["status"], 400);
        }

        #[tokio::test]
        async fn test_missing_field_is_server_error() {
            let (status, body) =
                body_json(PaginationError::missing_ordering_field("rank")).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["code"], "MISSING_ORDERING_FIELD");
        }

        #[tokio::test]
        async fn test_query_error_status_follows_retriability() {
            let (status, _) = body_json(
                QueryError::connection_failed(QueryOperation::Count, "refused").into(),
            )
            .await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

            let (status, body) = body_json(
                QueryError::database_error(QueryOperation::Fetch, "syntax").into(),
            )
            .await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["code"], "QUERY_ERROR");
        }
    }
}
