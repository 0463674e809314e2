use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::catalog::CatalogError;
use crate::db::StoreError;
use crate::engine::ValidationError;
use crate::term::TermError;

/// The JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorType {
    #[serde(skip)]
    pub status: StatusCode,

    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl ApiErrorType {
    /// Attaches an itemized list of problems to the error.
    pub fn with_issues(mut self, issues: Vec<String>) -> Self {
        self.issues = issues;
        self
    }
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, error, context): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            error: error.to_string(),
            context,
            issues: Vec::new(),
        }
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<CatalogError> for ApiErrorType {
    fn from(err: CatalogError) -> Self {
        let status = match err {
            CatalogError::Network { .. } | CatalogError::UnexpectedStatus { .. } => {
                StatusCode::BAD_GATEWAY
            }
            CatalogError::Parse { .. } | CatalogError::Url { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        ApiErrorType::from((status, "Failed to fetch course catalog", Some(err.to_string())))
    }
}

impl From<StoreError> for ApiErrorType {
    fn from(err: StoreError) -> Self {
        let (status, message) = match err {
            StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "Schedule not found"),
            StoreError::Duplicate { .. } => (StatusCode::CONFLICT, "Schedule already exists"),
            StoreError::Sqlite(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
        };

        ApiErrorType::from((status, message, Some(err.to_string())))
    }
}

impl From<ValidationError> for ApiErrorType {
    fn from(err: ValidationError) -> Self {
        ApiErrorType::from((StatusCode::BAD_REQUEST, "Invalid schedule request", None))
            .with_issues(err.messages())
    }
}

impl From<TermError> for ApiErrorType {
    fn from(err: TermError) -> Self {
        ApiErrorType::from((StatusCode::BAD_REQUEST, "Invalid term", Some(err.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::InputIssue;
    use serde_json::json;

    #[test]
    fn test_error_body_shape() {
        let err = ApiErrorType::from((StatusCode::NOT_FOUND, "Course not found", None));
        assert_eq!(serde_json::to_value(&err).unwrap(), json!({ "error": "Course not found" }));

        let err = ApiErrorType::from(ValidationError::new(vec![InputIssue::CandidatesNotAList {
            course: "A".to_string(),
        }]));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["issues"].as_array().unwrap().len(), 1);
        assert!(body.get("context").is_none());
    }

    #[test]
    fn test_status_mapping() {
        let not_found = ApiErrorType::from(StoreError::NotFound {
            name: "plan".to_string(),
        });
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.context.as_deref(), Some("Schedule plan not found"));

        let upstream = ApiErrorType::from(CatalogError::UnexpectedStatus {
            status: 503,
            url: "https://soc.example.edu".to_string(),
        });
        assert_eq!(upstream.status, StatusCode::BAD_GATEWAY);

        let term = ApiErrorType::from(TermError::UnknownTerm("autumn".to_string()));
        assert_eq!(term.status, StatusCode::BAD_REQUEST);
        assert_eq!(term.context.as_deref(), Some("Invalid semester: autumn"));
    }
}
