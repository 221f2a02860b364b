//! Add-feed flow end to end: form validation, proxy fetch, parse and store.

mod common;

use common::*;
use feedpulse::config::Config;
use feedpulse::state::{ErrorKind, FormStatus, LoadingStatus, State, StateEvent, ValidationKind};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_valid_url_adds_feed_and_posts() {
    let server = MockServer::start().await;
    serve_feed(&server, FEED1, rss("Lorem", &["P1", "P2"])).await;
    let app = session(&server, &Config::default());

    app.submit_url(FEED1).await.unwrap();

    app.store().read(|state| {
        assert_eq!(state.feeds().len(), 1);
        assert_eq!(state.feeds()[0].url, FEED1);
        assert_eq!(state.feeds()[0].title, "Lorem");
        assert_eq!(state.feeds()[0].description, "Lorem feed");
        assert_eq!(state.loading().status, LoadingStatus::Success);
        assert_eq!(state.form().status, FormStatus::Filling);
    });
    assert_eq!(post_titles(&app), vec!["P1", "P2"]);
}

#[tokio::test]
async fn test_newest_feed_first() {
    let server = MockServer::start().await;
    serve_feed(&server, FEED1, rss("One", &["A1"])).await;
    serve_feed(&server, FEED2, rss("Two", &["B1"])).await;
    let app = session(&server, &Config::default());

    app.submit_url(FEED1).await.unwrap();
    app.submit_url(FEED2).await.unwrap();

    let titles: Vec<String> = app
        .store()
        .read(|s| s.feeds().iter().map(|f| f.title.clone()).collect());
    assert_eq!(titles, vec!["Two", "One"]);
    assert_eq!(post_titles(&app), vec!["B1", "A1"]);
}

#[tokio::test]
async fn test_duplicate_rejected_without_second_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "contents": rss("Lorem", &["P1"]) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let app = session(&server, &Config::default());

    app.submit_url(FEED1).await.unwrap();
    let err = app.submit_url(FEED1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation(ValidationKind::Duplicate));
    app.store().read(|state| {
        assert_eq!(state.feeds().len(), 1);
        assert_eq!(state.form().status, FormStatus::Failed);
        assert!(!state.form().is_valid);
    });
    // MockServer verifies `.expect(1)` on drop
}

#[tokio::test]
async fn test_non_feed_body_is_invalid_resource() {
    let server = MockServer::start().await;
    serve_feed(&server, FEED1, "<html><body>hello</body></html>".to_string()).await;
    let app = session(&server, &Config::default());

    let err = app.submit_url(FEED1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidResource);
    app.store().read(|state| {
        assert!(state.feeds().is_empty());
        assert_eq!(state.loading().status, LoadingStatus::Failed);
        assert_eq!(state.loading().error, Some(ErrorKind::InvalidResource));
    });
}

#[tokio::test]
async fn test_proxy_failure_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = session(&server, &Config::default());

    let err = app.submit_url(FEED1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    app.store()
        .read(|state| assert_eq!(state.loading().error, Some(ErrorKind::Network)));
}

#[tokio::test]
async fn test_subscriber_sees_feed_before_posts() {
    let server = MockServer::start().await;
    serve_feed(&server, FEED1, rss("Lorem", &["P1"])).await;
    let app = session(&server, &Config::default());

    let paths = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&paths);
    app.store().update(|s| {
        s.subscribe(move |_: &State, event: &StateEvent| {
            sink.lock().unwrap().push(event.path());
        })
    });

    app.submit_url(FEED1).await.unwrap();

    let paths = paths.lock().unwrap().clone();
    let feeds_at = paths.iter().position(|p| *p == "feeds").unwrap();
    let posts_at = paths.iter().position(|p| *p == "posts").unwrap();
    assert!(feeds_at < posts_at);
    assert_eq!(paths.first(), Some(&"form.status"));
}
