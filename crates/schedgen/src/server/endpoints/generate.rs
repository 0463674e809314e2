use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::engine::{self, ScheduleRequest};
use crate::server::types::ApiErrorType;
use crate::server::util::generate_correlation_id;
use crate::types::AppState;

/// POST /api/sections/generate_schedules
///
/// Returns every conflict-free combination of the checked sections, one
/// section per course.
///
/// Body: `{"checkedSections": {course: [section, ...]}, "indexToMeetingTimesMap": {section: [meeting, ...]}}`
pub async fn post_generate_schedules(
    State(s): State<Arc<AppState>>,
    body: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Response {
    let correlation_id = generate_correlation_id();

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, "Rejected generation body: {}", rejection);
            return ApiErrorType::from((
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                Some(rejection.body_text()),
            ))
            .into_response();
        }
    };

    info!(
        correlation_id = %correlation_id,
        courses = request.checked_sections.len(),
        "POST /api/sections/generate_schedules"
    );

    let config = s.engine;
    let start = Instant::now();
    let outcome =
        tokio::task::spawn_blocking(move || engine::generate_from_request(&request, &config))
            .await;

    match outcome {
        Ok(Ok(outcome)) => {
            info!(
                correlation_id = %correlation_id,
                schedules = outcome.schedules.len(),
                truncated = outcome.truncated,
                nodes_visited = outcome.stats.nodes_visited,
                candidates_pruned = outcome.stats.candidates_pruned,
                workers = outcome.stats.workers,
                duration_ms = start.elapsed().as_millis() as u64,
                "Generated schedules"
            );

            (
                StatusCode::OK,
                Json(json!({
                    "message": "Generated all valid schedules",
                    "valid_schedules": outcome.schedules,
                    "truncated": outcome.truncated,
                })),
            )
                .into_response()
        }
        Ok(Err(e)) => {
            warn!(correlation_id = %correlation_id, "Invalid generation request: {}", e);
            ApiErrorType::from(e).into_response()
        }
        Err(e) => {
            error!(correlation_id = %correlation_id, "Schedule generation task failed: {}", e);
            ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate schedules",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::server::endpoints::test_util::{body_json, state, state_with, FakeCatalog};
    use serde_json::Value;

    fn request(body: Value) -> Result<Json<ScheduleRequest>, JsonRejection> {
        Ok(Json(serde_json::from_value(body).unwrap()))
    }

    #[tokio::test]
    async fn test_generate_schedules() {
        let response = post_generate_schedules(
            State(state()),
            request(json!({
                "checkedSections": { "01:198:111": ["09214", "09215"], "01:640:151": [10422] },
                "indexToMeetingTimesMap": {
                    "09214": [{ "meetingDay": "M", "startTimeMilitary": "1020", "endTimeMilitary": "1140" }],
                    "09215": [{ "meetingDay": "T", "startTimeMilitary": "1200", "endTimeMilitary": "1320" }],
                    "10422": [{ "day": "M", "start": "11:00", "end": "12:20" }]
                }
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Generated all valid schedules");
        assert_eq!(body["truncated"], false);
        assert_eq!(
            body["valid_schedules"],
            json!([{ "01:198:111": "09215", "01:640:151": "10422" }])
        );
    }

    #[tokio::test]
    async fn test_empty_selection_yields_one_empty_schedule() {
        let response = post_generate_schedules(
            State(state()),
            request(json!({ "checkedSections": {}, "indexToMeetingTimesMap": {} })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["valid_schedules"], json!([{}]));
    }

    #[tokio::test]
    async fn test_invalid_payload_lists_every_issue() {
        let response = post_generate_schedules(
            State(state()),
            request(json!({
                "checkedSections": { "A": ["1", "2"], "B": "3" },
                "indexToMeetingTimesMap": {
                    "1": [{ "day": "X", "start": "0900", "end": "1000" }]
                }
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid schedule request");
        assert!(body["issues"].as_array().unwrap().len() >= 2);
    }

    #[tokio::test]
    async fn test_truncated_output() {
        let engine = EngineConfig {
            max_schedules: Some(2),
            ..EngineConfig::default()
        };
        let response = post_generate_schedules(
            State(state_with(FakeCatalog::new(), engine)),
            request(json!({
                "checkedSections": { "A": ["1", "2", "3"] },
                "indexToMeetingTimesMap": { "1": [], "2": [], "3": [] }
            })),
        )
        .await;

        let body = body_json(response).await;
        assert_eq!(body["truncated"], true);
        assert_eq!(body["valid_schedules"], json!([{ "A": "1" }, { "A": "2" }]));
    }
}
