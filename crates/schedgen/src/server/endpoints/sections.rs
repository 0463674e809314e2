//! Course and section lookup endpoints, backed by the course catalog.

use std::sync::{Arc, LazyLock};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::catalog::{CatalogQuery, CourseMap, Level};
use crate::server::types::ApiErrorType;
use crate::server::util::generate_correlation_id;
use crate::term::Semester;
use crate::types::AppState;

/// `unit:subject:number`, e.g. `01:198:111`
static COURSE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}):(\d{3}):(\d{3})$").expect("valid course id regex"));

const DEFAULT_CAMPUS: &str = "NB";

/// Query parameters shared by the section endpoints. All are optional at the
/// extractor level so that a missing one yields our own 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct SectionQueryParams {
    pub subject: Option<String>,
    pub course_id: Option<String>,
    pub term: Option<String>,
    pub year: Option<String>,
    pub campus: Option<String>,
    pub level: Option<String>,
}

impl SectionQueryParams {
    /// Builds the catalog query for `subject`, checking term, year and level.
    fn catalog_query(&self, subject: &str) -> Result<CatalogQuery, ApiErrorType> {
        let (Some(term), Some(year)) = (&self.term, &self.year) else {
            return Err(missing_params());
        };

        let semester = Semester::parse(term, year)?;
        let level = match &self.level {
            Some(level) => level.parse::<Level>().map_err(|e| {
                ApiErrorType::from((StatusCode::BAD_REQUEST, "Invalid level", Some(e)))
            })?,
            None => Level::default(),
        };

        Ok(CatalogQuery {
            subject: subject.to_string(),
            semester,
            campus: self
                .campus
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CAMPUS)
                .to_ascii_uppercase(),
            level,
        })
    }

    /// Validates `course_id` and returns it together with its subject code.
    fn course_id(&self) -> Result<(&str, &str), ApiErrorType> {
        let Some(course_id) = self.course_id.as_deref().map(str::trim) else {
            return Err(missing_params());
        };

        let Some(captures) = COURSE_ID.captures(course_id) else {
            return Err(ApiErrorType::from((
                StatusCode::BAD_REQUEST,
                "Invalid course id",
                Some(format!("Expected unit:subject:number, got '{course_id}'")),
            )));
        };

        let subject = captures.get(2).map_or("", |m| m.as_str());
        Ok((course_id, subject))
    }
}

fn missing_params() -> ApiErrorType {
    ApiErrorType::from((StatusCode::BAD_REQUEST, "Missing required parameters", None))
}

/// Runs a catalog query, turning an empty answer into 404.
async fn lookup(
    s: &AppState,
    query: &CatalogQuery,
    correlation_id: &str,
) -> Result<CourseMap, ApiErrorType> {
    let courses = s.catalog.courses(query).await.map_err(|e| {
        if e.is_retryable() {
            warn!(correlation_id = %correlation_id, "Catalog temporarily unavailable: {}", e);
        } else {
            error!(correlation_id = %correlation_id, "Catalog lookup failed: {}", e);
        }
        ApiErrorType::from(e)
    })?;

    if courses.is_empty() {
        return Err(ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "No courses exist",
            Some(format!(
                "No {} courses in subject {} for {} on campus {}",
                query.level, query.subject, query.semester, query.campus
            )),
        )));
    }

    Ok(courses)
}

/// GET /api/sections/subject
///
/// Returns every course of a subject with its sections.
///
/// Query parameters: `subject`, `term`, `year`, optional `campus` and `level`.
pub async fn get_by_subject(
    State(s): State<Arc<AppState>>,
    Query(params): Query<SectionQueryParams>,
) -> Response {
    let correlation_id = generate_correlation_id();
    info!(
        correlation_id = %correlation_id,
        "GET /api/sections/subject (subject={:?}, term={:?}, year={:?})",
        params.subject, params.term, params.year
    );

    let result = async {
        let subject = params.subject.as_deref().ok_or_else(missing_params)?;
        let query = params.catalog_query(subject.trim())?;
        lookup(&s, &query, &correlation_id).await
    }
    .await;

    match result {
        Ok(courses) => (StatusCode::OK, Json(json!({ "sections": courses }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sections/expanded
///
/// Returns one course with full section details.
///
/// Query parameters: `course_id`, `term`, `year`, optional `campus` and `level`.
pub async fn get_expanded(
    State(s): State<Arc<AppState>>,
    Query(params): Query<SectionQueryParams>,
) -> Response {
    let correlation_id = generate_correlation_id();
    info!(
        correlation_id = %correlation_id,
        "GET /api/sections/expanded (course_id={:?})", params.course_id
    );

    let result = async {
        let (course_id, subject) = params.course_id()?;
        let query = params.catalog_query(subject)?;
        let mut courses = lookup(&s, &query, &correlation_id).await?;
        courses
            .remove(course_id)
            .map(|course| (course_id.to_string(), course))
            .ok_or_else(course_not_found)
    }
    .await;

    match result {
        Ok((course_id, course)) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Retrieve information for course {course_id}"),
                "sections": course,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sections
///
/// Returns the section numbers and registration indexes of one course.
pub async fn get_sections(
    State(s): State<Arc<AppState>>,
    Query(params): Query<SectionQueryParams>,
) -> Response {
    let correlation_id = generate_correlation_id();
    info!(
        correlation_id = %correlation_id,
        "GET /api/sections (course_id={:?})", params.course_id
    );

    let result = async {
        let (course_id, subject) = params.course_id()?;
        let query = params.catalog_query(subject)?;
        let courses = lookup(&s, &query, &correlation_id).await?;
        courses
            .get(course_id)
            .map(|course| course.section_summaries())
            .ok_or_else(course_not_found)
    }
    .await;

    match result {
        Ok(sections) => (StatusCode::OK, Json(json!({ "sections": sections }))).into_response(),
        Err(e) => e.into_response(),
    }
}

fn course_not_found() -> ApiErrorType {
    ApiErrorType::from((StatusCode::NOT_FOUND, "Course not found", None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::server::endpoints::test_util::{body_json, state, state_with, FakeCatalog};

    fn params(pairs: &[(&str, &str)]) -> SectionQueryParams {
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        Query::<SectionQueryParams>::try_from_uri(&format!("/?{query}").parse::<axum::http::Uri>().unwrap())
            .unwrap()
            .0
    }

    #[tokio::test]
    async fn test_get_by_subject() {
        let response = get_by_subject(
            State(state()),
            Query(params(&[("subject", "198"), ("term", "fall"), ("year", "2024")])),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let sections = body["sections"].as_object().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(
            body["sections"]["01:198:111"]["sections"]["01"]["index"],
            "09214"
        );
        assert_eq!(
            body["sections"]["01:198:111"]["sections"]["01"]["meeting_times"][0]["start"],
            "1020"
        );
    }

    #[tokio::test]
    async fn test_get_by_subject_errors() {
        let missing = get_by_subject(
            State(state()),
            Query(params(&[("subject", "198"), ("term", "fall")])),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(missing).await["error"], "Missing required parameters");

        let bad_term = get_by_subject(
            State(state()),
            Query(params(&[("subject", "198"), ("term", "autumn"), ("year", "2024")])),
        )
        .await;
        assert_eq!(bad_term.status(), StatusCode::BAD_REQUEST);

        let graduate = get_by_subject(
            State(state()),
            Query(params(&[
                ("subject", "198"),
                ("term", "fall"),
                ("year", "2024"),
                ("level", "G"),
            ])),
        )
        .await;
        assert_eq!(graduate.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(graduate).await["error"], "No courses exist");

        let down = get_by_subject(
            State(state_with(FakeCatalog::failing(), EngineConfig::default())),
            Query(params(&[("subject", "198"), ("term", "fall"), ("year", "2024")])),
        )
        .await;
        assert_eq!(down.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_get_expanded() {
        let response = get_expanded(
            State(state()),
            Query(params(&[
                ("course_id", "01:198:111"),
                ("term", "fall"),
                ("year", "2024"),
            ])),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Retrieve information for course 01:198:111");
        assert_eq!(body["sections"]["title"], "INTRO COMPUTER SCI");
        assert_eq!(body["sections"]["sections"]["02"]["open"], false);

        let unknown = get_expanded(
            State(state()),
            Query(params(&[
                ("course_id", "01:198:999"),
                ("term", "fall"),
                ("year", "2024"),
            ])),
        )
        .await;
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(unknown).await["error"], "Course not found");
    }

    #[tokio::test]
    async fn test_get_sections() {
        let response = get_sections(
            State(state()),
            Query(params(&[
                ("course_id", "01:198:111"),
                ("term", "spring"),
                ("year", "2025"),
                ("campus", "nb"),
            ])),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "sections": [
                { "section_number": "01", "index": "09214" },
                { "section_number": "02", "index": "09215" }
            ] })
        );

        let malformed = get_sections(
            State(state()),
            Query(params(&[("course_id", "198:111"), ("term", "fall"), ("year", "2024")])),
        )
        .await;
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(malformed).await["error"], "Invalid course id");
    }
}
