use anyhow::Result;
use chrono::Utc;
use serde_json::{Value, json};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

fn mirror_line(path: &Path, mut line: Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if let Some(obj) = line.as_object_mut() {
        obj.insert("ts".to_string(), json!(Utc::now().to_rfc3339()));
    }
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(f, "{line}")?;
    Ok(())
}

pub fn mirror_page(path: &Path, recipe: &str, first: u64, last: u64, sent: usize) -> Result<()> {
    mirror_line(
        path,
        json!({
            "kind": "page",
            "recipe": recipe,
            "first": first,
            "last": last,
            "statements": sent
        }),
    )
}

pub fn mirror_skip(path: &Path, recipe: &str, record_id: i64, reason: &str) -> Result<()> {
    mirror_line(
        path,
        json!({
            "kind": "skip",
            "recipe": recipe,
            "record": record_id,
            "reason": reason
        }),
    )
}

pub fn mirror_record_error(path: &Path, recipe: &str, record_id: i64, error: &str) -> Result<()> {
    mirror_line(
        path,
        json!({
            "kind": "error",
            "recipe": recipe,
            "record": record_id,
            "error": error
        }),
    )
}
