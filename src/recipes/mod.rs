use crate::domain::DomainLookup;
use crate::logstore::{LogFilter, LogRecord};
use crate::pipeline::{CanonicalEvent, Enriched, SkipReason};
use anyhow::Result;

/// The legacy log stores site-wide actions against course id 1.
pub const SITE_COURSE_ID: i64 = 1;

/// A recipe pairs a log-query filter with the enrichment that turns a matching
/// record into a canonical event. The set is fixed; recipes run in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    UserLoggedIn,
    CourseViewed,
    ModuleViewed,
    AssignmentSubmitted,
    AssignmentGraded,
}

impl Recipe {
    pub const ALL: [Recipe; 5] = [
        Recipe::UserLoggedIn,
        Recipe::CourseViewed,
        Recipe::ModuleViewed,
        Recipe::AssignmentSubmitted,
        Recipe::AssignmentGraded,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Recipe::UserLoggedIn => "user_loggedin",
            Recipe::CourseViewed => "course_viewed",
            Recipe::ModuleViewed => "module_viewed",
            Recipe::AssignmentSubmitted => "assignment_submitted",
            Recipe::AssignmentGraded => "assignment_graded",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Recipe::UserLoggedIn => "UserLoggedIn",
            Recipe::CourseViewed => "CourseViewed",
            Recipe::ModuleViewed => "ModuleViewed",
            Recipe::AssignmentSubmitted => "AssignmentSubmitted",
            Recipe::AssignmentGraded => "AssignmentGraded",
        }
    }

    pub fn from_key(key: &str) -> Option<Recipe> {
        Recipe::ALL.into_iter().find(|r| r.key() == key)
    }

    pub fn filter(&self) -> LogFilter {
        match self {
            Recipe::UserLoggedIn => LogFilter::module_action("user", &["login"]),
            Recipe::CourseViewed => LogFilter::module_action("course", &["view"]),
            Recipe::ModuleViewed => LogFilter::any_module(&["view"]),
            Recipe::AssignmentSubmitted => {
                LogFilter::module_action("assign", &["submit", "submit for grading"])
            }
            Recipe::AssignmentGraded => LogFilter::module_action("assign", &["grade submission"]),
        }
    }

    pub fn enrich(&self, record: &LogRecord, lookup: &DomainLookup) -> Result<Enriched> {
        match self {
            Recipe::UserLoggedIn => Ok(enrich_login(record)),
            Recipe::CourseViewed => enrich_course_viewed(record, lookup),
            Recipe::ModuleViewed => enrich_module_viewed(record, lookup),
            Recipe::AssignmentSubmitted => enrich_assignment_submitted(record, lookup),
            Recipe::AssignmentGraded => enrich_assignment_graded(record, lookup),
        }
    }
}

fn base_event(record: &LogRecord, eventname: String, courseid: i64) -> CanonicalEvent {
    CanonicalEvent {
        eventname,
        userid: record.userid,
        relateduserid: None,
        courseid,
        timecreated: record.time,
        objectid: None,
        objecttable: None,
        context_lang: None,
    }
}

fn course_lang(lang: &str) -> Option<String> {
    if lang.is_empty() {
        None
    } else {
        Some(lang.to_string())
    }
}

fn enrich_login(record: &LogRecord) -> Enriched {
    // The legacy log records logins against course 0; pin them to the site.
    Enriched::Event(base_event(
        record,
        r"\core\event\user_loggedin".to_string(),
        SITE_COURSE_ID,
    ))
}

fn enrich_course_viewed(record: &LogRecord, lookup: &DomainLookup) -> Result<Enriched> {
    let Some(course) = lookup.course(record.course)? else {
        return Ok(Enriched::Skip(SkipReason::Missing(format!(
            "unable to get course {}",
            record.course
        ))));
    };
    let mut event = base_event(record, r"\core\event\course_viewed".to_string(), course.id);
    event.context_lang = course_lang(&course.lang);
    Ok(Enriched::Event(event))
}

fn enrich_module_viewed(record: &LogRecord, lookup: &DomainLookup) -> Result<Enriched> {
    // A module view is a view action that carries a course module id.
    if record.cmid <= 0 {
        return Ok(Enriched::Skip(SkipReason::NotApplicable(format!(
            "view action in module {} has no course module id",
            record.module
        ))));
    }
    let Some(course) = lookup.course(record.course)? else {
        return Ok(Enriched::Skip(SkipReason::Missing(format!(
            "unable to get course {}",
            record.course
        ))));
    };
    let Some(cm) = lookup.course_module(record.course, record.cmid)? else {
        return Ok(Enriched::Skip(SkipReason::Missing(format!(
            "unable to get course module {} in course {}",
            record.cmid, record.course
        ))));
    };
    let mut event = base_event(
        record,
        format!(r"\mod_{}\event\course_module_viewed", record.module),
        course.id,
    );
    event.objectid = Some(cm.instance);
    event.objecttable = Some(cm.modname);
    event.context_lang = course_lang(&course.lang);
    Ok(Enriched::Event(event))
}

fn resolve_assignment(
    record: &LogRecord,
    lookup: &DomainLookup,
) -> Result<std::result::Result<(crate::domain::Course, crate::domain::CourseModule), SkipReason>> {
    let Some(course) = lookup.course(record.course)? else {
        return Ok(Err(SkipReason::Missing(format!(
            "unable to get course {}",
            record.course
        ))));
    };
    let Some(cm) = lookup.course_module(record.course, record.cmid)? else {
        return Ok(Err(SkipReason::Missing(format!(
            "unable to get course module {} in course {}",
            record.cmid, record.course
        ))));
    };
    Ok(Ok((course, cm)))
}

fn enrich_assignment_submitted(record: &LogRecord, lookup: &DomainLookup) -> Result<Enriched> {
    let (course, cm) = match resolve_assignment(record, lookup)? {
        Ok(found) => found,
        Err(reason) => return Ok(Enriched::Skip(reason)),
    };
    // The log cannot identify which submission a submit action produced, so
    // the newest one for this user and assignment stands in for all of them.
    let Some(submission) = lookup.latest_submission(record.userid, cm.instance)? else {
        return Ok(Enriched::Skip(SkipReason::Missing(format!(
            "no submission for user {} in assignment {}",
            record.userid, cm.instance
        ))));
    };
    let mut event = base_event(
        record,
        r"\mod_assign\event\assessable_submitted".to_string(),
        course.id,
    );
    event.objectid = Some(submission.id);
    event.objecttable = Some("assign_submission".to_string());
    event.context_lang = course_lang(&course.lang);
    Ok(Enriched::Event(event))
}

fn enrich_assignment_graded(record: &LogRecord, lookup: &DomainLookup) -> Result<Enriched> {
    let (course, cm) = match resolve_assignment(record, lookup)? {
        Ok(found) => found,
        Err(reason) => return Ok(Enriched::Skip(reason)),
    };
    let Some(grade) = lookup.latest_grade(record.userid, cm.instance)? else {
        return Ok(Enriched::Skip(SkipReason::Missing(format!(
            "no grade for user {} in assignment {}",
            record.userid, cm.instance
        ))));
    };
    let mut event = base_event(
        record,
        r"\mod_assign\event\submission_graded".to_string(),
        course.id,
    );
    event.objectid = Some(grade.id);
    event.objecttable = Some("assign_grades".to_string());
    event.context_lang = course_lang(&course.lang);
    Ok(Enriched::Event(event))
}
