use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::digest::{Digest, DIGEST_SUBJECT};
use crate::domain::subscriber_email::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::event_source::EventSourceClient;

use super::dispatch::{DispatchError, DispatchResponse};

#[derive(Deserialize)]
pub struct SingleDigestBody {
    pub email: String,
}

/// Single-recipient variant of the dispatch workflow: same fetch and format
/// steps, one send attempt to the caller-supplied address.
#[tracing::instrument(
    name = "Sending the digest to a single recipient",
    skip(body, email_client, event_source),
    fields(recipient_email = %body.email)
)]
pub async fn handle_send_single_digest(
    body: web::Json<SingleDigestBody>,
    email_client: web::Data<EmailClient>,
    event_source: web::Data<EventSourceClient>,
) -> Result<HttpResponse, DispatchError> {
    let recipient =
        SubscriberEmail::parse(body.email.clone()).map_err(DispatchError::ValidationError)?;

    let events = event_source
        .fetch_events()
        .await
        .map_err(DispatchError::FetchEventsError)?;
    let digest = Digest::build(&events);

    email_client
        .send_email(recipient, DIGEST_SUBJECT, &digest.text, &digest.html)
        .await
        .map_err(DispatchError::SendEmailError)?;

    Ok(HttpResponse::Ok().json(DispatchResponse { ok: true, sent: 1 }))
}
