//! Conflict-free schedule generation.
//!
//! The engine is a pure function of its input: a [`CourseSelection`] plus a
//! [`MeetingLookup`] go in, every conflict-free assignment of one section per
//! course comes out. It keeps no state between calls and touches no I/O, so
//! any number of generations may run at once.

mod error;
mod meeting;
mod normalize;
mod search;
mod types;

pub use error::{InputIssue, MeetingError, ValidationError};
pub use meeting::{overlaps, sections_conflict, Day, MeetingTime, SectionCandidate, LAST_MINUTE};
pub use normalize::{build_problem, ScheduleRequest, UnknownSectionPolicy};
pub use search::{
    search, CourseCandidates, ScheduleProblem, SearchOptions, SearchOutcome, SearchStats,
};
pub use types::{CourseSelection, MeetingLookup, Schedule};

use serde::{Deserialize, Serialize};

/// Engine settings, usually read from the `engine` section of the server config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub unknown_sections: UnknownSectionPolicy,

    #[serde(default)]
    pub max_schedules: Option<usize>,

    #[serde(default)]
    pub parallel_threshold: Option<u64>,
}

impl EngineConfig {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_schedules: self.max_schedules,
            parallel_threshold: self.parallel_threshold,
        }
    }
}

/// Generates every valid schedule for typed input.
///
/// All input problems are reported before any searching happens; on success
/// the search itself cannot fail, and an empty result is a normal outcome.
pub fn generate_schedules(
    selection: &CourseSelection,
    lookup: &MeetingLookup,
    config: &EngineConfig,
) -> Result<SearchOutcome, ValidationError> {
    let problem = build_problem(selection, lookup, config.unknown_sections)?;
    Ok(search(&problem, &config.search_options()))
}

/// Normalizes a raw request body and generates every valid schedule for it.
pub fn generate_from_request(
    request: &ScheduleRequest,
    config: &EngineConfig,
) -> Result<SearchOutcome, ValidationError> {
    let (selection, lookup) = request.normalize()?;
    generate_schedules(&selection, &lookup, config)
}
