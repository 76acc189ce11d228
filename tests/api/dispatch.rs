use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{events_body, TestApp};

/// Matches a send request addressed to the given recipient.
struct RecipientMatcher(&'static str);

impl wiremock::Match for RecipientMatcher {
    fn matches(&self, request: &wiremock::Request) -> bool {
        String::from_utf8_lossy(&request.body).contains(self.0)
    }
}

#[tokio::test]
async fn dispatch_without_a_key_is_rejected_and_touches_nothing() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.feed_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let response = test_app.post_dispatch(None).await;

    assert_eq!(401, response.status().as_u16());

    let response_body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(response_body["error"], "Unauthorized");
}

#[tokio::test]
async fn dispatch_with_a_wrong_key_is_rejected_and_touches_nothing() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.feed_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let response = test_app.post_dispatch(Some("not-the-secret")).await;

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn dispatch_accepts_the_key_as_a_query_parameter() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(5)))
        .expect(1)
        .mount(&test_app.feed_server)
        .await;

    let api_key = test_app.api_key.clone();
    let response = test_app.post_dispatch_with_query_key(&api_key).await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn dispatch_with_no_subscribers_reports_zero_sends() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(5)))
        .expect(1)
        .mount(&test_app.feed_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let api_key = test_app.api_key.clone();
    let response = test_app.post_dispatch(Some(&api_key)).await;

    assert_eq!(200, response.status().as_u16());

    let response_body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(response_body["ok"], true);
    assert_eq!(response_body["sent"], 0);
}

#[tokio::test]
async fn dispatch_sends_the_digest_to_every_subscriber() {
    let test_app = TestApp::spawn_app().await;

    test_app.seed_subscriber("a@test.com").await;
    test_app.seed_subscriber("b@test.com").await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(10)))
        .expect(1)
        .mount(&test_app.feed_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&test_app.email_server)
        .await;

    let api_key = test_app.api_key.clone();
    let response = test_app.post_dispatch(Some(&api_key)).await;

    assert_eq!(200, response.status().as_u16());

    let response_body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(response_body["ok"], true);
    assert_eq!(response_body["sent"], 2);

    // Every sent email carries the fixed digest subject
    let received_requests = &test_app.email_server.received_requests().await.unwrap();
    let first_send: serde_json::Value = serde_json::from_slice(&received_requests[0].body).unwrap();

    assert_eq!(first_send["subject"], "Your GitHub timeline update");
}

#[tokio::test]
async fn dispatch_isolates_a_failing_recipient() {
    let test_app = TestApp::spawn_app().await;

    test_app.seed_subscriber("a@test.com").await;
    test_app.seed_subscriber("b@test.com").await;
    test_app.seed_subscriber("c@test.com").await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(5)))
        .expect(1)
        .mount(&test_app.feed_server)
        .await;
    // The transport fails for b@test.com alone; mounted first so it takes
    // precedence over the catch-all below
    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .and(RecipientMatcher("b@test.com"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.email_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&test_app.email_server)
        .await;

    let api_key = test_app.api_key.clone();
    let response = test_app.post_dispatch(Some(&api_key)).await;

    assert_eq!(200, response.status().as_u16());

    let response_body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(response_body["ok"], true);
    assert_eq!(response_body["sent"], 2);
}

#[tokio::test]
async fn dispatch_fails_without_sending_when_the_feed_is_down() {
    let test_app = TestApp::spawn_app().await;

    test_app.seed_subscriber("a@test.com").await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.feed_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.email_server)
        .await;

    let api_key = test_app.api_key.clone();
    let response = test_app.post_dispatch(Some(&api_key)).await;

    assert_eq!(500, response.status().as_u16());

    let response_body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(response_body["error"], "Server error");
}
