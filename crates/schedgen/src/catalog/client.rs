//! HTTP client for the schedule-of-classes catalog.
//!
//! The catalog only serves whole-campus downloads per semester, so subject and
//! level filtering happen here after the (cached) download.

use super::cache::{CatalogCache, CatalogKey};
use super::error::CatalogError;
use super::types::{Course, CourseMap, SocCourse};
use super::{CatalogQuery, CourseCatalog};
use crate::term::Semester;
use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// Base URL of the schedule-of-classes API.
const SOC_BASE_URL: &str = "https://classes.rutgers.edu/soc/api";

/// Path of the course listing below the base URL.
const COURSES_PATH: &str = "courses.json";

/// Configuration for the catalog client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// How long a campus download stays cached
    pub cache_ttl_secs: u64,
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: SOC_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            timeout_secs: 30,
            cache_ttl_secs: 10 * 60,
            user_agent: concat!("schedgen/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Client for the schedule-of-classes API.
pub struct SocClient {
    client: Client,
    config: CatalogConfig,
    cache: Arc<CatalogCache>,
}

impl SocClient {
    pub fn new(config: CatalogConfig, cache: Arc<CatalogCache>) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Builds the download URL for one semester and campus.
    pub fn courses_url(&self, semester: &Semester, campus: &str) -> Result<Url, CatalogError> {
        let base = format!("{}/{}", self.config.base_url.trim_end_matches('/'), COURSES_PATH);
        let url = Url::parse_with_params(
            &base,
            &[
                ("year", semester.year.to_string()),
                ("term", semester.term.code().to_string()),
                ("campus", campus.to_string()),
            ],
        )?;
        Ok(url)
    }

    /// Returns the full campus catalog for a semester, from cache when possible.
    async fn fetch_catalog(
        &self,
        semester: &Semester,
        campus: &str,
    ) -> Result<Arc<Vec<SocCourse>>, CatalogError> {
        let key = CatalogKey::new(semester.code(), campus);
        if let Some(cached) = self.cache.get(&key) {
            debug!(key = %key, courses = cached.len(), "Catalog cache hit");
            return Ok(cached);
        }

        let url = self.courses_url(semester, campus)?;
        info!(key = %key, url = %url, "Downloading catalog");
        let start = Instant::now();

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(key = %key, status = status, "Catalog request failed");
            return Err(CatalogError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let courses: Vec<SocCourse> = serde_json::from_str(&text)?;
        let courses = Arc::new(courses);

        info!(
            key = %key,
            courses = courses.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Catalog downloaded"
        );

        self.cache
            .insert_with_ttl(key, Arc::clone(&courses), self.config.cache_ttl());
        Ok(courses)
    }
}

impl CourseCatalog for SocClient {
    fn courses<'a>(&'a self, query: &'a CatalogQuery) -> BoxFuture<'a, Result<CourseMap, CatalogError>> {
        async move {
            let raw = self.fetch_catalog(&query.semester, &query.campus).await?;
            Ok(filter_courses(&raw, query))
        }
        .boxed()
    }
}

/// Keeps the courses of `raw` matching the query's subject and level.
pub fn filter_courses(raw: &[SocCourse], query: &CatalogQuery) -> CourseMap {
    raw.iter()
        .filter(|c| c.subject == query.subject)
        .filter(|c| c.level.as_deref() == Some(query.level.catalog_code()))
        .map(|c| {
            let course = Course::from(c);
            (course.course_id.clone(), course)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Level;

    const SAMPLE: &str = r#"[
        { "courseString": "01:198:111", "offeringUnitCode": "01", "subject": "198",
          "courseNumber": "111", "title": "INTRO COMPUTER SCI", "level": "U",
          "sections": [{ "index": "09214", "number": "01", "openStatus": true }] },
        { "courseString": "16:198:512", "offeringUnitCode": "16", "subject": "198",
          "courseNumber": "512", "title": "INTRO DATA STRUCT", "level": "G", "sections": [] },
        { "courseString": "01:640:151", "offeringUnitCode": "01", "subject": "640",
          "courseNumber": "151", "title": "CALC I MATH/PHYS", "level": "U", "sections": [] }
    ]"#;

    fn query(subject: &str, level: Level) -> CatalogQuery {
        CatalogQuery {
            subject: subject.to_string(),
            semester: Semester::parse("fall", "2024").unwrap(),
            campus: "NB".to_string(),
            level,
        }
    }

    #[test]
    fn test_filter_by_subject_and_level() {
        let raw: Vec<SocCourse> = serde_json::from_str(SAMPLE).unwrap();

        let undergrad = filter_courses(&raw, &query("198", Level::Undergraduate));
        assert_eq!(undergrad.keys().collect::<Vec<_>>(), vec!["01:198:111"]);

        let grad = filter_courses(&raw, &query("198", Level::Graduate));
        assert_eq!(grad.keys().collect::<Vec<_>>(), vec!["16:198:512"]);

        assert!(filter_courses(&raw, &query("750", Level::Undergraduate)).is_empty());
    }

    #[test]
    fn test_courses_url() {
        let config = CatalogConfig {
            base_url: "https://catalog.example.edu/soc/api/".to_string(),
            ..CatalogConfig::default()
        };
        let client = SocClient::new(config, Arc::new(CatalogCache::default())).unwrap();

        let url = client
            .courses_url(&Semester::parse("spring", "2025").unwrap(), "NB")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://catalog.example.edu/soc/api/courses.json?year=2025&term=1&campus=NB"
        );
    }

    #[tokio::test]
    async fn test_courses_served_from_cache() {
        let cache = Arc::new(CatalogCache::default());
        let raw: Vec<SocCourse> = serde_json::from_str(SAMPLE).unwrap();
        cache.insert(CatalogKey::new("92024", "NB"), Arc::new(raw));

        // Unroutable base URL: only a cache hit can succeed.
        let config = CatalogConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..CatalogConfig::default()
        };
        let client = SocClient::new(config, cache).unwrap();

        let courses = client
            .courses(&query("640", Level::Undergraduate))
            .await
            .unwrap();
        assert_eq!(courses.keys().collect::<Vec<_>>(), vec!["01:640:151"]);
    }
}
