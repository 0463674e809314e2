//! Weekly meeting blocks and the conflict predicate between sections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MeetingError;

/// Last representable minute of a day (23:59).
pub const LAST_MINUTE: u16 = 24 * 60 - 1;

/// A day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    /// The single-letter code the course catalog uses for this day.
    pub fn catalog_code(self) -> &'static str {
        match self {
            Day::Mon => "M",
            Day::Tue => "T",
            Day::Wed => "W",
            Day::Thu => "H",
            Day::Fri => "F",
            Day::Sat => "S",
            Day::Sun => "U",
        }
    }
}

impl FromStr for Day {
    type Err = MeetingError;

    /// Accepts catalog codes (`M`, `T`, `W`, `H`, `F`, `S`, `U`), three-letter
    /// abbreviations and full names, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let day = match s.trim().to_ascii_lowercase().as_str() {
            "m" | "mon" | "monday" => Day::Mon,
            "t" | "tue" | "tues" | "tuesday" => Day::Tue,
            "w" | "wed" | "wednesday" => Day::Wed,
            "h" | "th" | "thu" | "thurs" | "thursday" => Day::Thu,
            "f" | "fri" | "friday" => Day::Fri,
            "s" | "sat" | "saturday" => Day::Sat,
            "u" | "su" | "sun" | "sunday" => Day::Sun,
            _ => return Err(MeetingError::UnknownDay(s.to_string())),
        };
        Ok(day)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.catalog_code())
    }
}

/// One contiguous weekly block `[start_minutes, end_minutes)` on a single day.
///
/// # Invariants
/// `start_minutes < end_minutes <= LAST_MINUTE`. The fields are private so the
/// only way to obtain a value is through [`MeetingTime::new`], which lets the
/// search assume every block it sees is well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MeetingTime {
    day: Day,
    start_minutes: u16,
    end_minutes: u16,
}

impl MeetingTime {
    /// Creates a checked meeting block.
    pub fn new(day: Day, start_minutes: u16, end_minutes: u16) -> Result<Self, MeetingError> {
        for minutes in [start_minutes, end_minutes] {
            if minutes > LAST_MINUTE {
                return Err(MeetingError::OutOfRange(minutes as u32));
            }
        }

        if start_minutes >= end_minutes {
            return Err(MeetingError::StartNotBeforeEnd {
                start: start_minutes,
                end: end_minutes,
            });
        }

        Ok(Self {
            day,
            start_minutes,
            end_minutes,
        })
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn start_minutes(&self) -> u16 {
        self.start_minutes
    }

    pub fn end_minutes(&self) -> u16 {
        self.end_minutes
    }
}

impl fmt::Display for MeetingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}-{:02}:{:02}",
            self.day,
            self.start_minutes / 60,
            self.start_minutes % 60,
            self.end_minutes / 60,
            self.end_minutes % 60
        )
    }
}

/// One selectable section (registration index) of a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCandidate {
    pub section_id: String,
    pub course_id: String,
    /// Empty for online/asynchronous sections.
    pub meeting_times: Vec<MeetingTime>,
}

impl SectionCandidate {
    pub fn new(
        section_id: impl Into<String>,
        course_id: impl Into<String>,
        meeting_times: Vec<MeetingTime>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            course_id: course_id.into(),
            meeting_times,
        }
    }
}

/// Returns true if both blocks fall on the same day and their half-open
/// intervals intersect. Blocks that only touch do not overlap.
#[inline]
pub fn overlaps(a: &MeetingTime, b: &MeetingTime) -> bool {
    a.day == b.day && a.start_minutes < b.end_minutes && b.start_minutes < a.end_minutes
}

/// Returns true if any block of `s1` overlaps any block of `s2`.
pub fn sections_conflict(s1: &SectionCandidate, s2: &SectionCandidate) -> bool {
    s1.meeting_times
        .iter()
        .any(|a| s2.meeting_times.iter().any(|b| overlaps(a, b)))
}
