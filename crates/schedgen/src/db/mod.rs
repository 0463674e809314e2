/// Database module for saved schedules

mod types;

pub use types::{DbSchedule, NewSchedule, SavedSchedule, SavedSection};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_schedules.sql");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schedule {name} not found")]
    NotFound { name: String },

    #[error("Schedule {name} already exists")]
    Duplicate { name: String },
}

pub struct ScheduleStore {
    db: Mutex<Connection>,
}

impl ScheduleStore {
    /// Opens (or creates) the database at `db_path` and initializes the schema
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        Self::init(Connection::open(db_path)?)
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave a half-applied write,
        // since every write runs inside a transaction.
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Saves a schedule and its sections atomically
    pub fn save_schedule(
        &self,
        new: &NewSchedule,
        sections: &[SavedSection],
    ) -> Result<SavedSchedule, StoreError> {
        let mut db = self.conn();
        let tx = db.transaction()?;
        let created_at = Utc::now();

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO schedules (username, schedule_name, term, year, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &new.username,
                &new.schedule_name,
                &new.term,
                &new.year,
                created_at,
            ),
        )?;

        if inserted == 0 {
            return Err(StoreError::Duplicate {
                name: new.schedule_name.clone(),
            });
        }

        let schedule_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO schedule_sections (schedule_id, course_id, index_num)
                 VALUES (?1, ?2, ?3)",
            )?;
            for section in sections {
                stmt.execute((schedule_id, &section.course_id, &section.index_num))?;
            }
        }

        tx.commit()?;

        Ok(SavedSchedule {
            schedule: DbSchedule {
                schedule_id,
                username: new.username.clone(),
                schedule_name: new.schedule_name.clone(),
                term: new.term.clone(),
                year: new.year.clone(),
                created_at,
            },
            sections: sections.to_vec(),
        })
    }

    /// Deletes a user's schedule together with its sections
    pub fn delete_schedule(
        &self,
        schedule_name: &str,
        username: &str,
        term: &str,
        year: &str,
    ) -> Result<(), StoreError> {
        let mut db = self.conn();
        let tx = db.transaction()?;

        let schedule_id: Option<i64> = tx
            .query_row(
                "SELECT schedule_id FROM schedules
                 WHERE schedule_name = ?1 AND username = ?2 AND term = ?3 AND year = ?4",
                (schedule_name, username, term, year),
                |row| row.get(0),
            )
            .optional()?;

        let Some(schedule_id) = schedule_id else {
            return Err(StoreError::NotFound {
                name: schedule_name.to_string(),
            });
        };

        tx.execute(
            "DELETE FROM schedule_sections WHERE schedule_id = ?1",
            [schedule_id],
        )?;
        tx.execute("DELETE FROM schedules WHERE schedule_id = ?1", [schedule_id])?;
        tx.commit()?;

        Ok(())
    }

    /// Gets all schedules of a user with their sections, newest first
    pub fn schedules_for_user(&self, username: &str) -> Result<Vec<SavedSchedule>, StoreError> {
        let db = self.conn();

        let mut stmt = db.prepare(
            "SELECT schedule_id, username, schedule_name, term, year, created_at
             FROM schedules
             WHERE username = ?
             ORDER BY schedule_id DESC",
        )?;

        let schedules: Vec<DbSchedule> = stmt
            .query_map([username], |row| {
                Ok(DbSchedule {
                    schedule_id: row.get(0)?,
                    username: row.get(1)?,
                    schedule_name: row.get(2)?,
                    term: row.get(3)?,
                    year: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut section_stmt = db.prepare(
            "SELECT course_id, index_num
             FROM schedule_sections
             WHERE schedule_id = ?
             ORDER BY schedule_section_id",
        )?;

        let mut result = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            let sections = section_stmt
                .query_map([schedule.schedule_id], |row| {
                    Ok(SavedSection {
                        course_id: row.get(0)?,
                        index_num: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            result.push(SavedSchedule { schedule, sections });
        }

        Ok(result)
    }
}
