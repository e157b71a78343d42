use crate::logstore::{LogFilter, LogRecord};
use anyhow::{Context, Result};
use rusqlite::{Connection, ToSql};
use std::path::Path;

/// Read-only paging over the snapshot's legacy `log` table.
pub struct LogStore<'c> {
    conn: &'c Connection,
}

pub fn open_snapshot(path: &Path) -> Result<Connection> {
    Connection::open(path).with_context(|| format!("open snapshot db {}", path.display()))
}

impl<'c> LogStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Returns the page of matching records starting at `offset`, in id order.
    /// Id order keeps consecutive offset pages gap- and duplicate-free as long
    /// as the snapshot is not written during the run. An empty page signals
    /// exhaustion.
    pub fn select(&self, filter: &LogFilter, offset: u64, limit: u64) -> Result<Vec<LogRecord>> {
        let mut sql = String::from(
            "SELECT id, time, userid, course, module, cmid, action, url, info FROM log",
        );
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();

        if let Some(module) = &filter.module {
            clauses.push("module = ?".to_string());
            params.push(module);
        }
        if !filter.actions.is_empty() {
            let marks = vec!["?"; filter.actions.len()].join(", ");
            clauses.push(format!("action IN ({marks})"));
            for action in filter.actions {
                params.push(action);
            }
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");
        // A wrapped negative LIMIT would read as unbounded to sqlite.
        let limit =
            i64::try_from(limit).with_context(|| format!("page size {limit} out of range"))?;
        let offset =
            i64::try_from(offset).with_context(|| format!("page offset {offset} out of range"))?;
        params.push(&limit);
        params.push(&offset);

        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("prepare log query: {sql}"))?;
        let rows = stmt
            .query_map(params.as_slice(), |row| {
                Ok(LogRecord {
                    id: row.get(0)?,
                    time: row.get(1)?,
                    userid: row.get(2)?,
                    course: row.get(3)?,
                    module: row.get(4)?,
                    cmid: row.get(5)?,
                    action: row.get(6)?,
                    url: row.get(7)?,
                    info: row.get(8)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
