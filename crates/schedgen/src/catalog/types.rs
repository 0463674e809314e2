/// Types for course catalog data
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw course record as served by the schedule-of-classes API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocCourse {
    pub course_string: Option<String>,
    #[serde(default)]
    pub offering_unit_code: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub course_number: String,
    pub title: Option<String>,
    pub expanded_title: Option<String>,
    /// "U" (undergraduate) or "G" (graduate)
    pub level: Option<String>,
    pub credits: Option<f32>,
    #[serde(default)]
    pub sections: Vec<SocSection>,
}

impl SocCourse {
    /// The `unit:subject:number` course id, e.g. "01:198:111"
    pub fn course_id(&self) -> String {
        match &self.course_string {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!(
                "{}:{}:{}",
                self.offering_unit_code, self.subject, self.course_number
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocSection {
    pub index: String,
    pub number: String,
    #[serde(default)]
    pub open_status: bool,
    #[serde(default)]
    pub instructors: Vec<SocInstructor>,
    #[serde(default)]
    pub meeting_times: Vec<SocMeetingTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocInstructor {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocMeetingTime {
    pub meeting_day: Option<String>,
    pub start_time_military: Option<String>,
    pub end_time_military: Option<String>,
    pub campus_name: Option<String>,
    pub building_code: Option<String>,
    pub room_number: Option<String>,
    pub meeting_mode_desc: Option<String>,
}

/// Course id -> course, sorted by id
pub type CourseMap = BTreeMap<String, Course>;

/// A course as returned by the section endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: String,
    pub subject: String,
    pub course_number: String,
    pub title: String,
    pub level: String,
    pub credits: Option<f32>,
    /// Section number -> section
    pub sections: BTreeMap<String, Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_number: String,
    pub index: String,
    pub open: bool,
    pub instructors: Vec<String>,
    pub meeting_times: Vec<CatalogMeeting>,
}

/// One meeting block. `day`, `start` and `end` use the same spelling the
/// schedule generator accepts, so clients can pass these straight through.
/// All three are empty for online/by-arrangement meetings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMeeting {
    pub day: String,
    pub start: String,
    pub end: String,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,
    pub mode: Option<String>,
}

/// Brief section listing (section number + registration index)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section_number: String,
    pub index: String,
}

impl From<&SocCourse> for Course {
    fn from(raw: &SocCourse) -> Self {
        let sections = raw
            .sections
            .iter()
            .map(|s| (s.number.clone(), Section::from(s)))
            .collect();

        Course {
            course_id: raw.course_id(),
            subject: raw.subject.clone(),
            course_number: raw.course_number.clone(),
            title: raw
                .expanded_title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .or(raw.title.as_deref())
                .unwrap_or_default()
                .to_string(),
            level: raw.level.clone().unwrap_or_default(),
            credits: raw.credits,
            sections,
        }
    }
}

impl From<&SocSection> for Section {
    fn from(raw: &SocSection) -> Self {
        Section {
            section_number: raw.number.clone(),
            index: raw.index.clone(),
            open: raw.open_status,
            instructors: raw.instructors.iter().map(|i| i.name.clone()).collect(),
            meeting_times: raw.meeting_times.iter().map(CatalogMeeting::from).collect(),
        }
    }
}

impl From<&SocMeetingTime> for CatalogMeeting {
    fn from(raw: &SocMeetingTime) -> Self {
        let text = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();

        CatalogMeeting {
            day: text(&raw.meeting_day),
            start: text(&raw.start_time_military),
            end: text(&raw.end_time_military),
            campus: raw.campus_name.clone(),
            building: raw.building_code.clone(),
            room: raw.room_number.clone(),
            mode: raw.meeting_mode_desc.clone(),
        }
    }
}

impl Course {
    pub fn section_summaries(&self) -> Vec<SectionSummary> {
        self.sections
            .values()
            .map(|s| SectionSummary {
                section_number: s.section_number.clone(),
                index: s.index.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "courseString": "01:198:111",
            "offeringUnitCode": "01",
            "subject": "198",
            "courseNumber": "111",
            "title": "INTRO COMPUTER SCI",
            "expandedTitle": "INTRODUCTION TO COMPUTER SCIENCE               ",
            "level": "U",
            "credits": 4.0,
            "sections": [
                {
                    "index": "09214",
                    "number": "01",
                    "openStatus": true,
                    "instructors": [{ "name": "SMITH, JOHN" }],
                    "meetingTimes": [
                        { "meetingDay": "M", "startTimeMilitary": "1020", "endTimeMilitary": "1140",
                          "campusName": "BUSCH", "buildingCode": "HLL", "roomNumber": "114", "meetingModeDesc": "LEC" },
                        { "meetingDay": "", "startTimeMilitary": "", "endTimeMilitary": "",
                          "campusName": "ONLINE", "meetingModeDesc": "ONLINE INSTRUCTION" }
                    ]
                }
            ]
        }
    ]"#;

    #[test]
    fn test_convert_soc_course() {
        let raw: Vec<SocCourse> = serde_json::from_str(SAMPLE).unwrap();
        let course = Course::from(&raw[0]);

        assert_eq!(course.course_id, "01:198:111");
        assert_eq!(course.title, "INTRODUCTION TO COMPUTER SCIENCE");
        assert_eq!(course.level, "U");

        let section = &course.sections["01"];
        assert_eq!(section.index, "09214");
        assert!(section.open);
        assert_eq!(section.instructors, vec!["SMITH, JOHN".to_string()]);
        assert_eq!(section.meeting_times[0].day, "M");
        assert_eq!(section.meeting_times[0].start, "1020");
        assert_eq!(section.meeting_times[1].day, "");

        assert_eq!(
            course.section_summaries(),
            vec![SectionSummary {
                section_number: "01".to_string(),
                index: "09214".to_string()
            }]
        );
    }

    #[test]
    fn test_course_id_falls_back_to_parts() {
        let raw: SocCourse = serde_json::from_str(
            r#"{ "offeringUnitCode": "01", "subject": "640", "courseNumber": "151" }"#,
        )
        .unwrap();
        assert_eq!(raw.course_id(), "01:640:151");
    }
}
