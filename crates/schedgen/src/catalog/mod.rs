/// Course catalog lookup (subjects, courses, sections, meeting times)
mod cache;
mod client;
mod error;
mod types;

pub use cache::{CacheStats, CatalogCache, CatalogKey};
pub use client::{filter_courses, CatalogConfig, SocClient};
pub use error::CatalogError;
pub use types::*;

use crate::term::Semester;
use futures::future::BoxFuture;
use std::fmt;
use std::str::FromStr;

/// Student level filter for catalog lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
    #[default]
    Undergraduate,
    Graduate,
}

impl Level {
    /// The level code used in catalog records
    pub fn catalog_code(self) -> &'static str {
        match self {
            Level::Undergraduate => "U",
            Level::Graduate => "G",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UG" | "U" => Ok(Level::Undergraduate),
            "G" | "GR" => Ok(Level::Graduate),
            _ => Err(format!("Invalid level: {s}")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Undergraduate => f.write_str("UG"),
            Level::Graduate => f.write_str("G"),
        }
    }
}

/// What to look up in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Three-digit subject code, e.g. "198"
    pub subject: String,
    pub semester: Semester,
    /// Campus code, e.g. "NB"
    pub campus: String,
    pub level: Level,
}

/// Source of course data. Implemented by [`SocClient`]; tests substitute an
/// in-memory catalog.
pub trait CourseCatalog: Send + Sync {
    /// All courses matching `query`, keyed by course id.
    fn courses<'a>(
        &'a self,
        query: &'a CatalogQuery,
    ) -> BoxFuture<'a, Result<CourseMap, CatalogError>>;
}
