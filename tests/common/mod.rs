//! Shared fixtures: a wiremock server standing in for the fetch proxy.

#![allow(dead_code)]

use feedpulse::app::App;
use feedpulse::config::Config;
use feedpulse::feed::{HttpFetcher, ProxyUrlBuilder};
use feedpulse::state::{SharedStore, Store};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FEED1: &str = "https://example.com/feed1";
pub const FEED2: &str = "https://example.com/feed2";

pub fn rss(title: &str, items: &[&str]) -> String {
    let items: String = items
        .iter()
        .map(|t| {
            format!(
                "<item><title>{t}</title><description>About {t}</description><link>https://example.com/posts/{t}</link></item>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>{title}</title><description>{title} feed</description>{items}</channel></rss>"#
    )
}

/// Serves `body` wrapped in the proxy's JSON envelope for `feed_url`.
pub async fn serve_feed(server: &MockServer, feed_url: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param("url", feed_url))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "contents": body })))
        .mount(server)
        .await;
}

pub fn fetcher_for(server: &MockServer) -> Arc<HttpFetcher> {
    let template = format!("{}/get?disableCache=true&url={{url}}", server.uri());
    Arc::new(HttpFetcher::with_client(
        reqwest::Client::new(),
        ProxyUrlBuilder::new(template),
        Duration::from_secs(5),
    ))
}

pub fn session(server: &MockServer, config: &Config) -> App<HttpFetcher> {
    App::new(SharedStore::new(Store::new()), fetcher_for(server), config)
}

pub fn post_titles(app: &App<HttpFetcher>) -> Vec<String> {
    app.store()
        .read(|state| state.posts().iter().map(|p| p.title.clone()).collect())
}
