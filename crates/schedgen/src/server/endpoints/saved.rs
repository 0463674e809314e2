//! Saved-schedule endpoints. Every handler here runs behind the auth
//! middleware, which supplies the caller's [`Identity`].

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::auth::Identity;
use crate::db::{NewSchedule, SavedSection, StoreError};
use crate::server::types::ApiErrorType;
use crate::term::Semester;
use crate::types::AppState;

/// Clients send the year either as a string or as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YearField {
    Text(String),
    Number(u64),
}

impl YearField {
    fn as_text(&self) -> String {
        match self {
            YearField::Text(s) => s.trim().to_string(),
            YearField::Number(n) => n.to_string(),
        }
    }
}

/// Identifies a schedule of the caller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBody {
    pub schedule_name: Option<String>,
    pub term: Option<String>,
    pub year: Option<YearField>,
    #[serde(default)]
    pub sections: Vec<SavedSection>,
}

impl ScheduleBody {
    /// Checks the name, term and year, returning them normalized: the name
    /// trimmed, the term as its lowercase name and the year as four digits.
    fn key(&self) -> Result<(String, Semester), ApiErrorType> {
        let name = self
            .schedule_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let (Some(name), Some(term), Some(year)) = (name, &self.term, &self.year) else {
            return Err(ApiErrorType::from((
                StatusCode::BAD_REQUEST,
                "Missing scheduleName, term, or year",
                None,
            )));
        };

        let semester = Semester::parse(term, &year.as_text())?;
        Ok((name.to_string(), semester))
    }
}

fn parse_body(body: Result<Json<ScheduleBody>, JsonRejection>) -> Result<ScheduleBody, ApiErrorType> {
    body.map(|Json(body)| body).map_err(|rejection| {
        ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            Some(rejection.body_text()),
        ))
    })
}

fn store_error(e: StoreError) -> ApiErrorType {
    if let StoreError::Sqlite(ref inner) = e {
        error!("Saved-schedule store failed: {}", inner);
    }
    ApiErrorType::from(e)
}

/// POST /api/sections/schedule
///
/// Saves a schedule for the caller.
///
/// Body: `{"scheduleName", "term", "year", "sections": [{"course_id", "index_num"}]}`
pub async fn post_schedule(
    State(s): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<ScheduleBody>, JsonRejection>,
) -> Response {
    let result = parse_body(body).and_then(|body| {
        let (name, semester) = body.key()?;
        info!(
            user = %identity.username(),
            "POST /api/sections/schedule ({} for {})", name, semester
        );

        let new = NewSchedule {
            username: identity.username().to_string(),
            schedule_name: name,
            term: semester.term.name().to_string(),
            year: semester.year.to_string(),
        };
        s.store
            .save_schedule(&new, &body.sections)
            .map_err(store_error)
    });

    match result {
        Ok(saved) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Successfully saved new schedule",
                "schedule": saved,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/sections/schedule
///
/// Deletes one of the caller's schedules.
///
/// Body: `{"scheduleName", "term", "year"}`
pub async fn delete_schedule(
    State(s): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<ScheduleBody>, JsonRejection>,
) -> Response {
    let result = parse_body(body).and_then(|body| {
        let (name, semester) = body.key()?;
        info!(
            user = %identity.username(),
            "DELETE /api/sections/schedule ({} for {})", name, semester
        );

        s.store
            .delete_schedule(
                &name,
                identity.username(),
                semester.term.name(),
                &semester.year.to_string(),
            )
            .map_err(store_error)?;
        Ok(name)
    });

    match result {
        Ok(name) => (
            StatusCode::OK,
            Json(json!({ "message": format!("Schedule {name} deleted successfully") })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sections/schedules
///
/// Returns all of the caller's schedules with their sections, newest first.
pub async fn get_schedules(
    State(s): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Response {
    info!(user = %identity.username(), "GET /api/sections/schedules");

    match s.store.schedules_for_user(identity.username()) {
        Ok(schedules) => (
            StatusCode::OK,
            Json(json!({
                "message": "Successfully retrieved saved schedules",
                "schedules": schedules,
            })),
        )
            .into_response(),
        Err(e) => store_error(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::endpoints::test_util::{body_json, state};
    use serde_json::Value;

    fn alice() -> Extension<Identity> {
        Extension(Identity("alice".to_string()))
    }

    fn body(value: Value) -> Result<Json<ScheduleBody>, JsonRejection> {
        Ok(Json(serde_json::from_value(value).unwrap()))
    }

    #[tokio::test]
    async fn test_save_list_delete() {
        let s = state();

        let saved = post_schedule(
            State(s.clone()),
            alice(),
            body(json!({
                "scheduleName": "plan a",
                "term": "Fall",
                "year": 2024,
                "sections": [{ "course_id": "01:198:111", "index_num": "09214" }]
            })),
        )
        .await;
        assert_eq!(saved.status(), StatusCode::CREATED);
        let saved = body_json(saved).await;
        assert_eq!(saved["schedule"]["schedule"]["term"], "fall");
        assert_eq!(saved["schedule"]["schedule"]["year"], "2024");
        assert_eq!(saved["schedule"]["sections"][0]["index_num"], "09214");

        let listed = body_json(get_schedules(State(s.clone()), alice()).await).await;
        assert_eq!(listed["schedules"].as_array().unwrap().len(), 1);
        assert_eq!(listed["schedules"][0]["schedule"]["schedule_name"], "plan a");

        let deleted = delete_schedule(
            State(s.clone()),
            alice(),
            body(json!({ "scheduleName": "plan a", "term": "fall", "year": "2024" })),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::OK);
        assert_eq!(
            body_json(deleted).await["message"],
            "Schedule plan a deleted successfully"
        );

        let listed = body_json(get_schedules(State(s), alice()).await).await;
        assert!(listed["schedules"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_errors() {
        let s = state();

        let missing = post_schedule(
            State(s.clone()),
            alice(),
            body(json!({ "scheduleName": "plan a", "term": "fall" })),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(missing).await["error"],
            "Missing scheduleName, term, or year"
        );

        let bad_year = post_schedule(
            State(s.clone()),
            alice(),
            body(json!({ "scheduleName": "plan a", "term": "fall", "year": "24" })),
        )
        .await;
        assert_eq!(bad_year.status(), StatusCode::BAD_REQUEST);

        let plan = json!({ "scheduleName": "plan a", "term": "fall", "year": "2024" });
        let first = post_schedule(State(s.clone()), alice(), body(plan.clone())).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let second = post_schedule(State(s), alice(), body(plan)).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_other_users_schedule() {
        let s = state();
        post_schedule(
            State(s.clone()),
            alice(),
            body(json!({ "scheduleName": "plan a", "term": "fall", "year": "2024" })),
        )
        .await;

        let response = delete_schedule(
            State(s),
            Extension(Identity("bob".to_string())),
            body(json!({ "scheduleName": "plan a", "term": "fall", "year": "2024" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["context"],
            "Schedule plan a not found"
        );
    }
}
