use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

#[derive(Debug, Clone)]
pub struct Course {
    pub id: i64,
    pub fullname: String,
    pub lang: String,
}

#[derive(Debug, Clone)]
pub struct CourseModule {
    pub id: i64,
    pub course: i64,
    pub instance: i64,
    pub modname: String,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub id: i64,
    pub timemodified: i64,
}

#[derive(Debug, Clone)]
pub struct Grade {
    pub id: i64,
    pub timemodified: i64,
}

/// Lookups against the platform snapshot needed for enrichment. `None` means
/// the referenced entity no longer exists, which callers treat as a
/// recoverable skip rather than an error.
pub struct DomainLookup<'c> {
    conn: &'c Connection,
}

impl<'c> DomainLookup<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn course(&self, id: i64) -> Result<Option<Course>> {
        self.conn
            .query_row(
                "SELECT id, fullname, lang FROM course WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Course {
                        id: row.get(0)?,
                        fullname: row.get(1)?,
                        lang: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn course_module(&self, course: i64, cmid: i64) -> Result<Option<CourseModule>> {
        self.conn
            .query_row(
                "SELECT id, course, instance, modname FROM course_modules
                 WHERE course = ?1 AND id = ?2",
                params![course, cmid],
                |row| {
                    Ok(CourseModule {
                        id: row.get(0)?,
                        course: row.get(1)?,
                        instance: row.get(2)?,
                        modname: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// The log has nothing granular enough to pick the submission a given
    /// submit action produced, so this always resolves to the newest one.
    pub fn latest_submission(&self, userid: i64, assignment: i64) -> Result<Option<Submission>> {
        self.conn
            .query_row(
                "SELECT id, timemodified FROM assign_submission
                 WHERE userid = ?1 AND assignment = ?2
                 ORDER BY timemodified DESC, id DESC LIMIT 1",
                params![userid, assignment],
                |row| {
                    Ok(Submission {
                        id: row.get(0)?,
                        timemodified: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn latest_grade(&self, userid: i64, assignment: i64) -> Result<Option<Grade>> {
        self.conn
            .query_row(
                "SELECT id, timemodified FROM assign_grades
                 WHERE userid = ?1 AND assignment = ?2
                 ORDER BY timemodified DESC, id DESC LIMIT 1",
                params![userid, assignment],
                |row| {
                    Ok(Grade {
                        id: row.get(0)?,
                        timemodified: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}
