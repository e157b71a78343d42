pub mod emit;
pub mod translate;

use crate::lrs::statement::Statement;
use anyhow::Result;
use emit::EmitContext;

/// Normalized, storage-agnostic representation of one logged occurrence.
/// Produced by a recipe's enrichment, consumed once by the translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEvent {
    pub eventname: String,
    pub userid: i64,
    pub relateduserid: Option<i64>,
    pub courseid: i64,
    pub timecreated: i64,
    pub objectid: Option<i64>,
    pub objecttable: Option<String>,
    pub context_lang: Option<String>,
}

/// Outcome of enrichment: either a canonical event or a reason the record
/// produces nothing.
#[derive(Debug, Clone)]
pub enum Enriched {
    Event(CanonicalEvent),
    Skip(SkipReason),
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    /// The record does not describe the recipe's occurrence at all (e.g. a
    /// view action with no course module id). Dropped silently.
    NotApplicable(String),
    /// A referenced domain entity has been deleted since the log was written.
    /// Logged as a warning, then dropped.
    Missing(String),
}

impl SkipReason {
    pub fn message(&self) -> &str {
        match self {
            SkipReason::NotApplicable(msg) | SkipReason::Missing(msg) => msg,
        }
    }
}

/// Runs the translate and build stages. Pure given the emit context, so the
/// same canonical event always yields the same statement apart from its
/// generated id.
pub struct StatementGenerator {
    cx: EmitContext,
}

impl StatementGenerator {
    pub fn new(cx: EmitContext) -> Self {
        Self { cx }
    }

    /// `Ok(None)` means the event's recipe has no registered builder, which is
    /// expected and non-fatal. `Err` means an event that should have been
    /// translatable or buildable was not.
    pub fn generate(&self, event: CanonicalEvent) -> Result<Option<Statement>> {
        let translated = translate::translate(event)?;
        emit::build(&self.cx, &translated)
    }
}
