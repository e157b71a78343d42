pub mod store;

/// One row of the legacy activity log. Owned by the platform snapshot and
/// never written by this tool.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub id: i64,
    pub time: i64,
    pub userid: i64,
    pub course: i64,
    pub module: String,
    pub cmid: i64,
    pub action: String,
    pub url: String,
    pub info: String,
}

/// Module/action predicate used to page through the log. An empty action
/// list matches any action.
#[derive(Debug, Clone, Copy)]
pub struct LogFilter {
    pub module: Option<&'static str>,
    pub actions: &'static [&'static str],
}

impl LogFilter {
    pub const fn module_action(module: &'static str, actions: &'static [&'static str]) -> Self {
        Self {
            module: Some(module),
            actions,
        }
    }

    pub const fn any_module(actions: &'static [&'static str]) -> Self {
        Self {
            module: None,
            actions,
        }
    }
}
