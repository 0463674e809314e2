//! Error types for schedule generation input.

use thiserror::Error;

/// Why a single meeting-time block was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeetingError {
    #[error("unknown day code '{0}'")]
    UnknownDay(String),

    #[error("unrecognized time '{0}'")]
    BadTime(String),

    #[error("time {0} is outside 0..=1439 minutes")]
    OutOfRange(u32),

    #[error("start {start} is not before end {end}")]
    StartNotBeforeEnd { start: u16, end: u16 },

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("expected an object with day, start and end")]
    NotAnObject,
}

/// One problem found while normalizing a generation request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputIssue {
    /// The candidate list of a course is not a JSON array.
    #[error("course '{course}': expected a list of section ids")]
    CandidatesNotAList { course: String },

    /// An element of a candidate list is neither a string nor an unsigned integer.
    #[error("course '{course}': entry {position} is not a section id")]
    BadSectionId { course: String, position: usize },

    /// A section was selected under two different courses.
    #[error("section '{section}' is listed under both '{first}' and '{second}'")]
    SectionInMultipleCourses {
        section: String,
        first: String,
        second: String,
    },

    /// A selected section has no entry in the meeting-time map.
    #[error("section '{section}' of course '{course}' has no meeting-time entry")]
    UnknownSection { section: String, course: String },

    /// Two meeting-time entries name the same section once trimmed.
    #[error("section '{section}' has more than one meeting-time entry")]
    DuplicateSection { section: String },

    /// The meeting-time entry of a section is not a JSON array.
    #[error("section '{section}': expected a list of meeting times")]
    MeetingsNotAList { section: String },

    /// A meeting-time block could not be normalized.
    #[error("section '{section}', meeting {position}: {reason}")]
    MalformedMeeting {
        section: String,
        position: usize,
        reason: MeetingError,
    },
}

/// A generation request that failed validation. Holds every issue found, in
/// the order they were encountered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid schedule request{}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<InputIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<InputIssue>) -> Self {
        Self { issues }
    }

    /// Human-readable lines, one per issue.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

fn summarize(issues: &[InputIssue]) -> String {
    match issues {
        [only] => format!(": {only}"),
        issues => format!(" ({} issues)", issues.len()),
    }
}
