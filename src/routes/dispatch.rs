use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::digest::{Digest, DIGEST_SUBJECT};
use crate::domain::subscriber_email::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::event_source::EventSourceClient;
use crate::startup::DispatchApiKey;

#[derive(Deserialize, Debug)]
pub struct DispatchParameters {
    pub key: Option<String>,
}

#[derive(serde::Serialize)]
pub struct DispatchResponse {
    pub ok: bool,
    pub sent: usize,
}

#[tracing::instrument(
    name = "Dispatching the digest to all subscribers",
    skip(request, parameters, db_pool, email_client, event_source, api_key)
)]
pub async fn handle_dispatch_digest(
    request: HttpRequest,
    parameters: web::Query<DispatchParameters>,
    db_pool: web::Data<PgPool>,
    email_client: web::Data<EmailClient>,
    event_source: web::Data<EventSourceClient>,
    api_key: web::Data<DispatchApiKey>,
) -> Result<HttpResponse, DispatchError> {
    // No fetch and no store access before the secret has been checked
    authorize_dispatch(&request, &parameters, &api_key)?;

    let events = event_source
        .fetch_events()
        .await
        .map_err(DispatchError::FetchEventsError)?;
    let digest = Digest::build(&events);
    let subscribers = get_subscribers(&db_pool).await?;

    let sent = deliver_digest(&email_client, &subscribers, &digest).await;

    Ok(HttpResponse::Ok().json(DispatchResponse { ok: true, sent }))
}

/// The caller provides the shared secret either through the `x-api-key` header
/// or the `key` query parameter; comparison is exact equality.
fn authorize_dispatch(
    request: &HttpRequest,
    parameters: &web::Query<DispatchParameters>,
    api_key: &DispatchApiKey,
) -> Result<(), DispatchError> {
    let provided_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(String::from)
        .or_else(|| parameters.key.clone());

    match provided_key {
        Some(key) if key == api_key.0.expose_secret().as_str() => Ok(()),
        _ => Err(DispatchError::UnauthorizedError),
    }
}

pub async fn get_subscribers(
    db_pool: &web::Data<PgPool>,
) -> Result<Vec<SubscriberEmail>, DispatchError> {
    sqlx::query(
        r#"
        SELECT email
        FROM subscribers
        "#,
    )
    .map(|row: PgRow| SubscriberEmail::parse(row.get("email")).unwrap())
    .fetch_all(db_pool.as_ref())
    .await
    .map_err(DispatchError::GetSubscribersError)
}

/// One send attempt per subscriber. A failed recipient is logged and kept in
/// the outcome list as a failure; it never aborts the remaining sends and is
/// never retried. The count of successes is the aggregation of those outcomes.
#[tracing::instrument(
    name = "Delivering the digest to the subscriber list",
    skip(email_client, subscribers, digest),
    fields(subscriber_count = subscribers.len())
)]
async fn deliver_digest(
    email_client: &EmailClient,
    subscribers: &[SubscriberEmail],
    digest: &Digest,
) -> usize {
    let mut outcomes = Vec::with_capacity(subscribers.len());

    for subscriber in subscribers {
        let delivery = email_client
            .send_email(
                subscriber.clone(),
                DIGEST_SUBJECT,
                &digest.text,
                &digest.html,
            )
            .await;

        if let Err(err) = &delivery {
            tracing::error!(
                "Failed to send the digest to {}: {:?}",
                subscriber.as_ref(),
                err
            );
        }

        outcomes.push(delivery);
    }

    outcomes.iter().filter(|outcome| outcome.is_ok()).count()
}

#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("The dispatch secret is missing or does not match.")]
    UnauthorizedError,
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to fetch events from the upstream feed.")]
    FetchEventsError(#[source] reqwest::Error),
    #[error("Failed to get subscribers from the database.")]
    GetSubscribersError(#[source] sqlx::Error),
    #[error("Failed to send the digest email.")]
    SendEmailError(#[source] reqwest::Error),
}

impl std::fmt::Debug for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for DispatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::UnauthorizedError => StatusCode::UNAUTHORIZED,
            DispatchError::ValidationError(_) => StatusCode::BAD_REQUEST,
            DispatchError::FetchEventsError(_)
            | DispatchError::GetSubscribersError(_)
            | DispatchError::SendEmailError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Internal detail stays in the logs; the caller only sees the generic body
    fn error_response(&self) -> HttpResponse {
        let message = match self {
            DispatchError::UnauthorizedError => "Unauthorized",
            DispatchError::ValidationError(_) => "Invalid email",
            DispatchError::FetchEventsError(_)
            | DispatchError::GetSubscribersError(_)
            | DispatchError::SendEmailError(_) => "Server error",
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}
