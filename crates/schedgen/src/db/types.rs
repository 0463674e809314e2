/// Database types for saved schedules
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies a schedule to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub username: String,
    pub schedule_name: String,
    pub term: String,
    pub year: String,
}

/// One section chosen in a saved schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSection {
    pub course_id: String,
    pub index_num: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbSchedule {
    pub schedule_id: i64,
    pub username: String,
    pub schedule_name: String,
    pub term: String,
    pub year: String,
    pub created_at: DateTime<Utc>,
}

/// A schedule together with its sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSchedule {
    pub schedule: DbSchedule,
    pub sections: Vec<SavedSection>,
}
