use crate::lrs::statement::{Activity, Agent, Context, Statement, Verb};
use crate::pipeline::translate::TranslatedEvent;
use anyhow::{Result, anyhow, bail};
use chrono::DateTime;
use uuid::Uuid;

const DEFAULT_LANG: &str = "en";

/// Fixed inputs every builder needs: where objects and actor accounts live.
#[derive(Debug, Clone)]
pub struct EmitContext {
    pub platform_url: String,
    pub platform_name: String,
}

type BuilderFn = fn(&EmitContext, &TranslatedEvent, &str) -> Result<Statement>;

/// Routing table from recipe key to builder, resolved by plain lookup. Keys
/// absent from this table are recipes the emitter does not support.
const ROUTES: &[(&str, BuilderFn)] = &[
    ("user_loggedin", build_site_statement),
    ("course_viewed", build_course_statement),
    ("module_viewed", build_module_statement),
    ("assignment_submitted", build_submission_statement),
    ("assignment_graded", build_grade_statement),
];

/// `Ok(None)` when no builder is registered for the event's recipe key; that
/// is an expected drop, not an error. A registered builder failing on a
/// well-formed event is an error for that record.
pub fn build(cx: &EmitContext, translated: &TranslatedEvent) -> Result<Option<Statement>> {
    let Some((_, builder)) = ROUTES
        .iter()
        .copied()
        .find(|(key, _)| *key == translated.recipe)
    else {
        return Ok(None);
    };
    let lang = translated
        .event
        .context_lang
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANG);
    builder(cx, translated, lang).map(Some)
}

fn statement_parts(
    cx: &EmitContext,
    t: &TranslatedEvent,
    lang: &str,
    object: Activity,
) -> Result<Statement> {
    let timestamp = DateTime::from_timestamp(t.event.timecreated, 0)
        .ok_or_else(|| anyhow!("invalid timestamp {} on log record", t.event.timecreated))?;
    Ok(Statement {
        id: Uuid::new_v4(),
        actor: Agent::for_user(&cx.platform_url, t.event.userid),
        verb: Verb::new(t.verb_id, lang, t.verb_display),
        object,
        context: Context {
            platform: cx.platform_name.clone(),
            language: lang.to_string(),
        },
        timestamp,
    })
}

fn build_site_statement(cx: &EmitContext, t: &TranslatedEvent, lang: &str) -> Result<Statement> {
    let object = Activity::new(format!("{}/", cx.platform_url), t.activity_type);
    statement_parts(cx, t, lang, object)
}

fn build_course_statement(cx: &EmitContext, t: &TranslatedEvent, lang: &str) -> Result<Statement> {
    let object = Activity::new(
        format!("{}/course/view.php?id={}", cx.platform_url, t.event.courseid),
        t.activity_type,
    );
    statement_parts(cx, t, lang, object)
}

fn build_module_statement(cx: &EmitContext, t: &TranslatedEvent, lang: &str) -> Result<Statement> {
    let (objectid, table) = require_object(t)?;
    let object = Activity::new(
        format!("{}/mod/{}/view.php?id={}", cx.platform_url, table, objectid),
        t.activity_type,
    );
    statement_parts(cx, t, lang, object)
}

fn build_submission_statement(
    cx: &EmitContext,
    t: &TranslatedEvent,
    lang: &str,
) -> Result<Statement> {
    let (objectid, _) = require_object(t)?;
    let object = Activity::new(
        format!("{}/mod/assign/submission.php?id={}", cx.platform_url, objectid),
        t.activity_type,
    );
    statement_parts(cx, t, lang, object)
}

fn build_grade_statement(cx: &EmitContext, t: &TranslatedEvent, lang: &str) -> Result<Statement> {
    let (objectid, _) = require_object(t)?;
    let object = Activity::new(
        format!("{}/mod/assign/grade.php?id={}", cx.platform_url, objectid),
        t.activity_type,
    );
    statement_parts(cx, t, lang, object)
}

fn require_object<'t>(t: &'t TranslatedEvent) -> Result<(i64, &'t str)> {
    let objectid = t
        .event
        .objectid
        .ok_or_else(|| anyhow!("event {} has no object id", t.event.eventname))?;
    let Some(table) = t.event.objecttable.as_deref() else {
        bail!("event {} has no object table", t.event.eventname);
    };
    Ok((objectid, table))
}
