use actix_web::{web, HttpResponse};

use crate::digest::{format_summary, DIGEST_EVENT_LIMIT};
use crate::domain::event::GithubEvent;
use crate::event_source::EventSourceClient;

use super::dispatch::DispatchError;

#[derive(serde::Serialize)]
pub struct PreviewResponse {
    pub ok: bool,
    pub summary: String,
    pub events: Vec<GithubEvent>,
}

/// Read-only variant of the dispatch workflow: fetch and format, no send.
/// No shared secret required.
#[tracing::instrument(name = "Previewing the digest", skip(event_source))]
pub async fn handle_preview_digest(
    event_source: web::Data<EventSourceClient>,
) -> Result<HttpResponse, DispatchError> {
    let mut events = event_source
        .fetch_events()
        .await
        .map_err(DispatchError::FetchEventsError)?;
    let summary = format_summary(&events, DIGEST_EVENT_LIMIT);

    events.truncate(DIGEST_EVENT_LIMIT);

    Ok(HttpResponse::Ok().json(PreviewResponse {
        ok: true,
        summary,
        events,
    }))
}
