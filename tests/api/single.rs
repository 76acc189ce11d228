use std::collections::HashMap;

use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{events_body, TestApp};

#[tokio::test]
async fn single_send_delivers_the_digest_to_the_given_address() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("email", "frank@test.com");

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(5)))
        .expect(1)
        .mount(&test_app.feed_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app.post_single(body).await;

    assert_eq!(200, response.status().as_u16());

    let response_body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(response_body["ok"], true);
    assert_eq!(response_body["sent"], 1);

    let received_requests = &test_app.email_server.received_requests().await.unwrap();
    let send_body = String::from_utf8_lossy(&received_requests[0].body).to_string();

    assert!(send_body.contains("frank@test.com"));
}

#[tokio::test]
async fn single_send_rejects_an_invalid_email_before_fetching() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("email", "not-an-email");

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

    let response = test_app.post_single(body).await;

    assert_eq!(400, response.status().as_u16());

    let response_body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(response_body["error"], "Invalid email");
}

#[tokio::test]
async fn single_send_fails_when_the_feed_is_down() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("email", "frank@test.com");

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

    let response = test_app.post_single(body).await;

    assert_eq!(500, response.status().as_u16());
}

#[tokio::test]
async fn single_send_fails_when_the_transport_fails() {
    let test_app = TestApp::spawn_app().await;
    let mut body = HashMap::new();

    body.insert("email", "frank@test.com");

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body(5)))
        .expect(1)
        .mount(&test_app.feed_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mail/send"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&test_app.email_server)
        .await;

    let response = test_app.post_single(body).await;

    assert_eq!(500, response.status().as_u16());
}
