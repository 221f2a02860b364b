use url::form_urlencoded;

/// Placeholder in the proxy template that receives the encoded feed URL.
pub const URL_PLACEHOLDER: &str = "{url}";

/// Rewrites feed URLs so they are fetched through a CORS-style proxy.
///
/// The proxy answers with a JSON envelope whose `contents` field holds the
/// upstream document (see [`HttpFetcher`](super::HttpFetcher)).
#[derive(Debug, Clone)]
pub struct ProxyUrlBuilder {
    template: String,
}

impl ProxyUrlBuilder {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn build(&self, feed_url: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(feed_url.as_bytes()).collect();
        self.template.replace(URL_PLACEHOLDER, &encoded)
    }
}
