//! Value types passed into and out of the schedule generator.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use super::meeting::MeetingTime;

/// The student's selection: for each course, the section ids they are
/// considering, in the order the courses were first given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseSelection {
    courses: Vec<(String, Vec<String>)>,
}

impl CourseSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends candidates for `course_id`. A course given twice keeps its
    /// original position and accumulates the new candidates.
    pub fn add_course<I, S>(&mut self, course_id: impl Into<String>, sections: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let course_id = course_id.into();
        let sections = sections.into_iter().map(Into::into);

        match self.courses.iter_mut().find(|(id, _)| *id == course_id) {
            Some((_, existing)) => existing.extend(sections),
            None => self.courses.push((course_id, sections.collect())),
        }
    }

    /// Builder-style variant of [`CourseSelection::add_course`].
    pub fn with_course<I, S>(mut self, course_id: impl Into<String>, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_course(course_id, sections);
        self
    }

    pub fn courses(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.courses
            .iter()
            .map(|(course, sections)| (course.as_str(), sections.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Section id -> the section's weekly meeting blocks.
pub type MeetingLookup = HashMap<String, Vec<MeetingTime>>;

/// One complete, conflict-free assignment of a section to every course.
///
/// Serializes as a JSON object from course id to section id, keys in course
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Schedule {
    choices: Vec<(String, String)>,
}

impl Schedule {
    pub(crate) fn from_choices(choices: Vec<(String, String)>) -> Self {
        Self { choices }
    }

    /// The section chosen for `course_id`, if the course is part of this schedule.
    pub fn section_for(&self, course_id: &str) -> Option<&str> {
        self.choices
            .iter()
            .find(|(course, _)| course == course_id)
            .map(|(_, section)| section.as_str())
    }

    pub fn choices(&self) -> impl Iterator<Item = (&str, &str)> {
        self.choices
            .iter()
            .map(|(course, section)| (course.as_str(), section.as_str()))
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.choices.len()))?;
        for (course, section) in &self.choices {
            map.serialize_entry(course, section)?;
        }
        map.end()
    }
}
