use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Store-ready xAPI statement. Immutable once built; appended to a batch and
/// relinquished to the uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub id: Uuid,
    pub actor: Agent,
    pub verb: Verb,
    pub object: Activity,
    pub context: Context,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    #[serde(rename = "objectType")]
    pub object_type: String,
    pub account: Account,
}

impl Agent {
    pub fn for_user(home_page: &str, userid: i64) -> Self {
        Self {
            object_type: "Agent".to_string(),
            account: Account {
                home_page: home_page.to_string(),
                name: userid.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub home_page: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verb {
    pub id: String,
    pub display: BTreeMap<String, String>,
}

impl Verb {
    pub fn new(id: &str, lang: &str, display: &str) -> Self {
        Self {
            id: id.to_string(),
            display: BTreeMap::from([(lang.to_string(), display.to_string())]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "objectType")]
    pub object_type: String,
    pub id: String,
    pub definition: ActivityDefinition,
}

impl Activity {
    pub fn new(id: String, activity_type: &str) -> Self {
        Self {
            object_type: "Activity".to_string(),
            id,
            definition: ActivityDefinition {
                activity_type: activity_type.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDefinition {
    #[serde(rename = "type")]
    pub activity_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub platform: String,
    pub language: String,
}
