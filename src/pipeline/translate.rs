use crate::pipeline::CanonicalEvent;
use anyhow::{Result, bail};

/// Vocabulary resolved for one canonical event: the routing key the statement
/// builder dispatches on plus the xAPI verb and activity type.
#[derive(Debug, Clone)]
pub struct TranslatedEvent {
    pub recipe: &'static str,
    pub verb_id: &'static str,
    pub verb_display: &'static str,
    pub activity_type: &'static str,
    pub event: CanonicalEvent,
}

const VERB_LOGGED_IN: &str = "https://brindlewaye.com/xAPITerms/verbs/loggedin/";
const VERB_VIEWED: &str = "http://id.tincanapi.com/verb/viewed";
const VERB_SUBMITTED: &str = "http://activitystrea.ms/schema/1.0/submit";
const VERB_SCORED: &str = "http://adlnet.gov/expapi/verbs/scored";

const TYPE_SITE: &str = "http://id.tincanapi.com/activitytype/site";
const TYPE_COURSE: &str = "http://id.tincanapi.com/activitytype/lms/course";
const TYPE_MODULE: &str = "http://adlnet.gov/expapi/activities/module";
const TYPE_ASSIGNMENT: &str = "http://id.tincanapi.com/activitytype/school-assignment";

/// Deterministic vocabulary resolution keyed by event name. By the time an
/// event is canonical it must be translatable, so an unrecognized name is an
/// error for the record rather than a skip.
pub fn translate(event: CanonicalEvent) -> Result<TranslatedEvent> {
    let (recipe, verb_id, verb_display, activity_type) = match event.eventname.as_str() {
        r"\core\event\user_loggedin" => {
            ("user_loggedin", VERB_LOGGED_IN, "logged in", TYPE_SITE)
        }
        r"\core\event\course_viewed" => ("course_viewed", VERB_VIEWED, "viewed", TYPE_COURSE),
        r"\mod_assign\event\assessable_submitted" => (
            "assignment_submitted",
            VERB_SUBMITTED,
            "submitted",
            TYPE_ASSIGNMENT,
        ),
        r"\mod_assign\event\submission_graded" => {
            ("assignment_graded", VERB_SCORED, "scored", TYPE_ASSIGNMENT)
        }
        name if is_module_viewed(name) => ("module_viewed", VERB_VIEWED, "viewed", TYPE_MODULE),
        name => bail!("no translation for event {name}"),
    };

    Ok(TranslatedEvent {
        recipe,
        verb_id,
        verb_display,
        activity_type,
        event,
    })
}

fn is_module_viewed(name: &str) -> bool {
    name.starts_with(r"\mod_") && name.ends_with(r"\event\course_module_viewed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str) -> CanonicalEvent {
        CanonicalEvent {
            eventname: name.to_string(),
            userid: 7,
            relateduserid: None,
            courseid: 3,
            timecreated: 1_600_000_000,
            objectid: None,
            objecttable: None,
            context_lang: None,
        }
    }

    #[test]
    fn resolves_fixed_event_names() {
        let t = translate(event(r"\core\event\user_loggedin")).unwrap();
        assert_eq!(t.recipe, "user_loggedin");
        assert_eq!(t.verb_display, "logged in");

        let t = translate(event(r"\mod_assign\event\submission_graded")).unwrap();
        assert_eq!(t.recipe, "assignment_graded");
        assert_eq!(t.verb_id, "http://adlnet.gov/expapi/verbs/scored");
    }

    #[test]
    fn resolves_module_viewed_for_any_module_name() {
        for name in [
            r"\mod_forum\event\course_module_viewed",
            r"\mod_quiz\event\course_module_viewed",
        ] {
            let t = translate(event(name)).unwrap();
            assert_eq!(t.recipe, "module_viewed");
        }
    }

    #[test]
    fn unknown_event_name_is_an_error() {
        let err = translate(event(r"\core\event\user_deleted")).unwrap_err();
        assert!(format!("{err}").contains("no translation"));
    }

    #[test]
    fn translation_is_deterministic() {
        let a = translate(event(r"\core\event\course_viewed")).unwrap();
        let b = translate(event(r"\core\event\course_viewed")).unwrap();
        assert_eq!(a.recipe, b.recipe);
        assert_eq!(a.verb_id, b.verb_id);
        assert_eq!(a.event, b.event);
    }
}
