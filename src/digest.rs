use crate::domain::event::GithubEvent;

/// How many events make it into a digest.
pub const DIGEST_EVENT_LIMIT: usize = 5;

pub const DIGEST_SUBJECT: &str = "Your GitHub timeline update";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Text and HTML renderings of the same event summary. Derived, never stored.
#[derive(Debug, Clone)]
pub struct Digest {
    pub text: String,
    pub html: String,
}

impl Digest {
    pub fn build(events: &[GithubEvent]) -> Digest {
        let summary = format_summary(events, DIGEST_EVENT_LIMIT);

        Digest {
            text: format!("Latest events:\n\n{}", summary),
            html: format!(
                "<p>Here are the latest GitHub public events (top 5):</p><pre>{}</pre>",
                summary
            ),
        }
    }
}

/// Project the first `limit` events into one line each, newline-joined.
/// Input order is preserved; no filtering, no re-sorting.
pub fn format_summary(events: &[GithubEvent], limit: usize) -> String {
    events
        .iter()
        .take(limit)
        .map(event_line)
        .collect::<Vec<String>>()
        .join("\n")
}

// Absent optional fields render as "unknown" ("Event" for a missing type),
// so a sparse record can never fail to format.
fn event_line(event: &GithubEvent) -> String {
    let kind = event.kind.as_deref().unwrap_or("Event");
    let repo = event
        .repo
        .as_ref()
        .and_then(|repo| repo.name.as_deref())
        .unwrap_or("unknown");
    let actor = event
        .actor
        .as_ref()
        .and_then(|actor| actor.login.as_deref().or(actor.display_login.as_deref()))
        .unwrap_or("unknown");
    let time = event
        .created_at
        .map(|created_at| created_at.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| String::from("unknown"));

    format!("• [{}] {} by {} ({})", kind, repo, actor, time)
}
