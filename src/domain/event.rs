use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single record from the public events feed.
///
/// Every field the feed might omit is modeled as an `Option`; the fallback
/// substitution happens when the digest is formatted, not here.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubEvent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub actor: Option<EventActor>,
    pub repo: Option<EventRepo>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventActor {
    pub login: Option<String>,
    pub display_login: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventRepo {
    pub name: Option<String>,
}
