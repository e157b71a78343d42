#![allow(dead_code)]

use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use std::sync::Mutex;
use xapi_backfill::lrs::statement::Statement;
use xapi_backfill::lrs::{About, StatementStore};
use xapi_backfill::pipeline::emit::EmitContext;

/// In-memory platform snapshot with the tables the pipeline reads.
pub fn snapshot() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "
        CREATE TABLE log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            time INTEGER NOT NULL,
            userid INTEGER NOT NULL,
            course INTEGER NOT NULL,
            module TEXT NOT NULL,
            cmid INTEGER NOT NULL,
            action TEXT NOT NULL,
            url TEXT NOT NULL DEFAULT '',
            info TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE course (
            id INTEGER PRIMARY KEY,
            fullname TEXT NOT NULL,
            lang TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE course_modules (
            id INTEGER PRIMARY KEY,
            course INTEGER NOT NULL,
            instance INTEGER NOT NULL,
            modname TEXT NOT NULL
        );

        CREATE TABLE assign_submission (
            id INTEGER PRIMARY KEY,
            assignment INTEGER NOT NULL,
            userid INTEGER NOT NULL,
            timemodified INTEGER NOT NULL
        );

        CREATE TABLE assign_grades (
            id INTEGER PRIMARY KEY,
            assignment INTEGER NOT NULL,
            userid INTEGER NOT NULL,
            timemodified INTEGER NOT NULL
        );
        ",
    )
    .unwrap();
    conn
}

pub fn insert_log(
    conn: &Connection,
    time: i64,
    userid: i64,
    course: i64,
    module: &str,
    cmid: i64,
    action: &str,
) {
    conn.execute(
        "INSERT INTO log (time, userid, course, module, cmid, action)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![time, userid, course, module, cmid, action],
    )
    .unwrap();
}

pub fn insert_course(conn: &Connection, id: i64, fullname: &str, lang: &str) {
    conn.execute(
        "INSERT INTO course (id, fullname, lang) VALUES (?1, ?2, ?3)",
        params![id, fullname, lang],
    )
    .unwrap();
}

pub fn insert_course_module(conn: &Connection, id: i64, course: i64, instance: i64, modname: &str) {
    conn.execute(
        "INSERT INTO course_modules (id, course, instance, modname) VALUES (?1, ?2, ?3, ?4)",
        params![id, course, instance, modname],
    )
    .unwrap();
}

pub fn insert_submission(
    conn: &Connection,
    id: i64,
    assignment: i64,
    userid: i64,
    timemodified: i64,
) {
    conn.execute(
        "INSERT INTO assign_submission (id, assignment, userid, timemodified)
         VALUES (?1, ?2, ?3, ?4)",
        params![id, assignment, userid, timemodified],
    )
    .unwrap();
}

pub fn insert_grade(conn: &Connection, id: i64, assignment: i64, userid: i64, timemodified: i64) {
    conn.execute(
        "INSERT INTO assign_grades (id, assignment, userid, timemodified)
         VALUES (?1, ?2, ?3, ?4)",
        params![id, assignment, userid, timemodified],
    )
    .unwrap();
}

pub fn emit_cx() -> EmitContext {
    EmitContext {
        platform_url: "https://vle.example.ac.uk".to_string(),
        platform_name: "Moodle".to_string(),
    }
}

/// Statement store that records every submitted batch instead of talking to
/// a network.
#[derive(Default)]
pub struct RecordingStore {
    pub batches: Mutex<Vec<Vec<Statement>>>,
    pub fail_about: bool,
    pub fail_save: bool,
}

impl StatementStore for RecordingStore {
    fn about(&self) -> Result<About> {
        if self.fail_about {
            bail!("connection refused");
        }
        Ok(About {
            versions: vec!["1.0.3".to_string(), "1.0.1".to_string()],
        })
    }

    fn save_statements(&self, statements: &[Statement]) -> Result<()> {
        self.batches.lock().unwrap().push(statements.to_vec());
        if self.fail_save {
            bail!("statements returned 502 Bad Gateway");
        }
        Ok(())
    }
}

impl RecordingStore {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }
}
