use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::domain::event::GithubEvent;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
// The events API rejects requests that carry no User-Agent
const USER_AGENT: &str = concat!("timeline-digest/", env!("CARGO_PKG_VERSION"));

pub struct EventSourceClient {
    http_client: Client,
    base_url: String,
    token: Option<Secret<String>>,
}

impl EventSourceClient {
    pub fn new(
        base_url: String,
        token: Option<Secret<String>>,
        timeout: Option<time::Duration>,
    ) -> EventSourceClient {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .unwrap();

        EventSourceClient {
            http_client,
            base_url,
            token,
        }
    }

    /// Fetch the most recent public events, most-recent-first as delivered by
    /// the feed. One attempt per call; transport failures and non-2xx statuses
    /// are returned to the caller.
    pub async fn fetch_events(&self) -> Result<Vec<GithubEvent>, reqwest::Error> {
        let url = format!("{}/events", self.base_url);
        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token.expose_secret()));
        }

        let events = request
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<GithubEvent>>()
            .await?;

        Ok(events)
    }
}
