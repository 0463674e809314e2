use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::catalog::CatalogKey;
use crate::server::types::ApiErrorType;
use crate::term::Semester;
use crate::types::AppState;

/// GET /health
pub async fn get_health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

/// GET /api/catalog/cache_stats
///
/// Returns catalog cache statistics for monitoring.
pub async fn get_cache_stats(State(s): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, Json(s.catalog_cache.stats())).into_response()
}

/// Selects a single cached download. Without all three, the whole cache is
/// cleared.
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateParams {
    pub term: Option<String>,
    pub year: Option<String>,
    pub campus: Option<String>,
}

/// POST /api/catalog/invalidate_cache
///
/// Invalidates one semester/campus download, or the whole catalog cache.
pub async fn invalidate_cache(
    State(s): State<Arc<AppState>>,
    Query(params): Query<InvalidateParams>,
) -> Response {
    match (&params.term, &params.year, &params.campus) {
        (Some(term), Some(year), Some(campus)) => {
            let semester = match Semester::parse(term, year) {
                Ok(semester) => semester,
                Err(e) => return ApiErrorType::from(e).into_response(),
            };

            let key = CatalogKey::new(semester.code(), campus);
            info!(key = %key, "POST /api/catalog/invalidate_cache");
            s.catalog_cache.invalidate(&key);

            (
                StatusCode::OK,
                Json(json!({ "message": format!("Cache entry {key} invalidated") })),
            )
                .into_response()
        }
        _ => {
            info!("POST /api/catalog/invalidate_cache (all entries)");
            s.catalog_cache.clear();
            (StatusCode::OK, Json(json!({ "message": "Cache invalidated" }))).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SocCourse;
    use crate::server::endpoints::test_util::{body_json, state};

    fn seed(s: &AppState, semester_code: &str) {
        let course: SocCourse =
            serde_json::from_str(r#"{ "subject": "198", "courseNumber": "111" }"#).unwrap();
        s.catalog_cache
            .insert(CatalogKey::new(semester_code, "NB"), Arc::new(vec![course]));
    }

    #[tokio::test]
    async fn test_cache_stats_and_invalidate() {
        let s = state();
        seed(&s, "92024");
        seed(&s, "12025");

        let stats = body_json(get_cache_stats(State(s.clone())).await).await;
        assert_eq!(stats["active_entries"], 2);
        assert_eq!(stats["cached_courses"], 2);

        let one = invalidate_cache(
            State(s.clone()),
            Query(InvalidateParams {
                term: Some("fall".to_string()),
                year: Some("2024".to_string()),
                campus: Some("nb".to_string()),
            }),
        )
        .await;
        assert_eq!(one.status(), StatusCode::OK);
        assert_eq!(s.catalog_cache.len(), 1);

        invalidate_cache(State(s.clone()), Query(InvalidateParams::default())).await;
        assert!(s.catalog_cache.is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let response = get_health().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }
}
