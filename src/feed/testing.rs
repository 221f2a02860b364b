//! In-memory fetcher for unit tests.

use super::fetcher::{FeedFetcher, FetchError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Scripted {
    Body(String),
    Status(u16),
    Timeout,
}

/// Serves canned responses per URL and counts requests.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Scripted>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    starts: Mutex<Vec<tokio::time::Instant>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps `delay` (tokio time) before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set(&self, url: &str, response: Scripted) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> Vec<tokio::time::Instant> {
        self.starts.lock().unwrap().clone()
    }
}

impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.starts.lock().unwrap().push(tokio::time::Instant::now());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Status(code)) => Err(FetchError::HttpStatus(code)),
            Some(Scripted::Timeout) => Err(FetchError::Timeout),
            None => Err(FetchError::HttpStatus(404)),
        }
    }
}

/// Builds a minimal RSS 2.0 document.
pub fn rss(title: &str, items: &[&str]) -> String {
    let items: String = items
        .iter()
        .map(|t| {
            format!(
                "<item><title>{t}</title><description>{t} text</description><link>https://example.com/{t}</link></item>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>{title}</title><description>{title} description</description>{items}</channel></rss>"#
    )
}
