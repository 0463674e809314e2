//! Converts the loosely-typed generation payload into checked engine input.
//!
//! Validation is a single pass that records every problem it finds, so a
//! client gets the full list of issues back instead of fixing them one by one.
//! Nothing here ever reaches the search when an issue is recorded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::error::{InputIssue, MeetingError, ValidationError};
use super::meeting::{Day, MeetingTime, SectionCandidate, LAST_MINUTE};
use super::search::{CourseCandidates, ScheduleProblem};
use super::types::{CourseSelection, MeetingLookup};

/// What to do with a selected section that has no meeting-time entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSectionPolicy {
    /// Fail the request with [`InputIssue::UnknownSection`].
    #[default]
    Reject,
    /// Treat the section as having no meeting times.
    Unconstrained,
}

/// The body of a schedule generation request.
///
/// Both maps keep the key order of the request body, which fixes the order in
/// which courses are searched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleRequest {
    #[serde(rename = "checkedSections")]
    pub checked_sections: Map<String, Value>,

    #[serde(rename = "indexToMeetingTimesMap")]
    pub index_to_meeting_times_map: Map<String, Value>,
}

impl ScheduleRequest {
    /// Validates the payload shape and converts it into typed engine input.
    pub fn normalize(&self) -> Result<(CourseSelection, MeetingLookup), ValidationError> {
        let mut issues = Vec::new();

        let mut selection = CourseSelection::new();
        for (course, candidates) in &self.checked_sections {
            let Some(candidates) = candidates.as_array() else {
                issues.push(InputIssue::CandidatesNotAList {
                    course: course.clone(),
                });
                continue;
            };

            let mut sections = Vec::with_capacity(candidates.len());
            for (position, candidate) in candidates.iter().enumerate() {
                match section_id(candidate) {
                    Some(id) => sections.push(id),
                    None => issues.push(InputIssue::BadSectionId {
                        course: course.clone(),
                        position,
                    }),
                }
            }
            selection.add_course(course.clone(), sections);
        }

        let mut lookup = MeetingLookup::with_capacity(self.index_to_meeting_times_map.len());
        for (section, meetings) in &self.index_to_meeting_times_map {
            let Some(meetings) = meetings.as_array() else {
                issues.push(InputIssue::MeetingsNotAList {
                    section: section.clone(),
                });
                continue;
            };

            let mut times = Vec::with_capacity(meetings.len());
            for (position, meeting) in meetings.iter().enumerate() {
                match parse_meeting(meeting) {
                    Ok(Some(time)) => times.push(time),
                    Ok(None) => {}
                    Err(reason) => issues.push(InputIssue::MalformedMeeting {
                        section: section.clone(),
                        position,
                        reason,
                    }),
                }
            }
            let key = section.trim().to_string();
            if lookup.insert(key.clone(), times).is_some() {
                issues.push(InputIssue::DuplicateSection { section: key });
            }
        }

        if issues.is_empty() {
            Ok((selection, lookup))
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

/// Resolves every selected section id against the meeting-time lookup.
///
/// Duplicate ids within one course collapse to their first occurrence. A
/// section selected under two courses is an error, as is (under
/// [`UnknownSectionPolicy::Reject`]) a section missing from `lookup`.
pub fn build_problem(
    selection: &CourseSelection,
    lookup: &MeetingLookup,
    policy: UnknownSectionPolicy,
) -> Result<ScheduleProblem, ValidationError> {
    let mut issues = Vec::new();
    let mut owners: HashMap<&str, &str> = HashMap::new();
    let mut courses = Vec::with_capacity(selection.len());

    for (course, sections) in selection.courses() {
        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(sections.len());

        for section in sections {
            if !seen.insert(section.as_str()) {
                debug!(course = %course, section = %section, "Dropping duplicate candidate");
                continue;
            }

            if let Some(first) = owners.insert(section.as_str(), course) {
                issues.push(InputIssue::SectionInMultipleCourses {
                    section: section.clone(),
                    first: first.to_string(),
                    second: course.to_string(),
                });
                continue;
            }

            let meeting_times = match (lookup.get(section), policy) {
                (Some(times), _) => times.clone(),
                (None, UnknownSectionPolicy::Unconstrained) => {
                    debug!(
                        course = %course,
                        section = %section,
                        "Section has no meeting times, treating it as unconstrained"
                    );
                    Vec::new()
                }
                (None, UnknownSectionPolicy::Reject) => {
                    issues.push(InputIssue::UnknownSection {
                        section: section.clone(),
                        course: course.to_string(),
                    });
                    continue;
                }
            };

            candidates.push(SectionCandidate::new(section.clone(), course, meeting_times));
        }

        courses.push(CourseCandidates::new(course, candidates));
    }

    if issues.is_empty() {
        Ok(ScheduleProblem::new(courses))
    } else {
        Err(ValidationError::new(issues))
    }
}

fn section_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}

fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| object.get(*name))
        .find(|value| !is_blank(value))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Parses one meeting object. Returns `Ok(None)` for an unscheduled block,
/// i.e. one whose day and times are all absent or empty.
fn parse_meeting(value: &Value) -> Result<Option<MeetingTime>, MeetingError> {
    let object = value.as_object().ok_or(MeetingError::NotAnObject)?;

    let day = field(object, &["day", "meetingDay"]);
    let start = field(object, &["start", "startTimeMilitary"]);
    let end = field(object, &["end", "endTimeMilitary"]);

    if day.is_none() && start.is_none() && end.is_none() {
        return Ok(None);
    }

    let day = match day.ok_or(MeetingError::MissingField("day"))? {
        Value::String(code) => code.parse::<Day>()?,
        other => return Err(MeetingError::UnknownDay(other.to_string())),
    };
    let start = parse_minutes(start.ok_or(MeetingError::MissingField("start"))?)?;
    let end = parse_minutes(end.ok_or(MeetingError::MissingField("end"))?)?;

    MeetingTime::new(day, start, end).map(Some)
}

/// Accepts integer minutes since midnight, `"HHMM"` military time or `"H:MM"`.
fn parse_minutes(value: &Value) -> Result<u16, MeetingError> {
    match value {
        Value::Number(n) => {
            let minutes = n
                .as_u64()
                .ok_or_else(|| MeetingError::BadTime(n.to_string()))?;
            if minutes > LAST_MINUTE as u64 {
                return Err(MeetingError::OutOfRange(
                    u32::try_from(minutes).unwrap_or(u32::MAX),
                ));
            }
            Ok(minutes as u16)
        }
        Value::String(text) => parse_clock(text.trim()).ok_or_else(|| MeetingError::BadTime(text.clone())),
        other => Err(MeetingError::BadTime(other.to_string())),
    }
}

fn parse_clock(text: &str) -> Option<u16> {
    let (hours, minutes) = match text.split_once(':') {
        Some((h, m)) if m.len() == 2 => (h, m),
        Some(_) => return None,
        None if (3..=4).contains(&text.len()) => text.split_at(text.len() - 2),
        None => return None,
    };

    if hours.is_empty() || !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }

    Some(hours * 60 + minutes)
}
