use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    new_subscriber::{NewSubscriber, SignupBody},
    subscriber::Subscriber,
    subscriber_email::SubscriberEmail,
};

#[derive(serde::Serialize)]
struct SignupResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, db_pool),
    fields(subscriber_email = %body.email)
)]
pub async fn handle_create_subscription(
    body: web::Json<SignupBody>,
    db_pool: web::Data<PgPool>,
) -> impl Responder {
    let new_subscriber: NewSubscriber = match body.try_into() {
        Ok(subscriber) => subscriber,
        Err(err) => {
            tracing::error!("Validation error: {:?}", err);
            return HttpResponse::BadRequest()
                .json(serde_json::json!({ "error": "Invalid email" }));
        }
    };

    match insert_subscriber(&new_subscriber, &db_pool).await {
        Ok(Some(_)) => HttpResponse::Ok().json(SignupResponse {
            ok: true,
            message: None,
        }),
        // The store already holds this email; signing up twice is not an error
        Ok(None) => HttpResponse::Ok().json(SignupResponse {
            ok: true,
            message: Some(String::from("Email already saved")),
        }),
        Err(err) => {
            tracing::error!("Failed to insert new subscriber: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Server error" }))
        }
    }
}

/// Insert the subscriber, returning `None` when the email was already stored.
/// Uniqueness is the store constraint's job: a duplicate surfaces as the
/// `ON CONFLICT DO NOTHING` clause returning no row, never as an error to match
/// against.
#[tracing::instrument(
    name = "Insert a new subscriber into the database",
    skip(new_subscriber, db_pool)
)]
async fn insert_subscriber(
    new_subscriber: &NewSubscriber,
    db_pool: &web::Data<PgPool>,
) -> Result<Option<Subscriber>, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO subscribers (id, email, subscribed_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, email, subscribed_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_subscriber.email.as_ref())
    .bind(Utc::now())
    .map(|row: PgRow| Subscriber {
        id: row.get("id"),
        email: SubscriberEmail::parse(row.get("email")).unwrap(),
        subscribed_at: row.get("subscribed_at"),
    })
    .fetch_optional(db_pool.get_ref())
    .await
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        err
    })
}
