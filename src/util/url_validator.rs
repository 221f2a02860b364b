use crate::state::ValidationKind;
use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons a submitted feed URL is rejected before any network access.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing was entered.
    #[error("URL is required")]
    Required,
    /// The input is not an absolute http(s) URL we are willing to fetch.
    #[error("Malformed URL: {0}")]
    Malformed(String),
    /// A feed with this exact URL is already subscribed.
    #[error("Feed already added: {0}")]
    Duplicate(String),
}

impl ValidationError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            ValidationError::Required => ValidationKind::Required,
            ValidationError::Malformed(_) => ValidationKind::Malformed,
            ValidationError::Duplicate(_) => ValidationKind::Duplicate,
        }
    }
}

/// Validates a candidate feed URL against the already-subscribed set.
///
/// Checks run in a fixed order: presence, then well-formedness, then
/// uniqueness. Uniqueness compares the trimmed input against `known_urls`
/// verbatim, since that is the form in which feed URLs are stored.
///
/// Localhost and private-network hosts are rejected as malformed unless
/// `allow_private_hosts` is set.
///
/// # Errors
///
/// - [`ValidationError::Required`] for empty or whitespace-only input
/// - [`ValidationError::Malformed`] for unparsable, non-http(s), hostless or
///   disallowed-host URLs
/// - [`ValidationError::Duplicate`] when the URL is already known
///
/// # Examples
///
/// ```
/// use feedpulse::util::{validate_feed_url, ValidationError};
///
/// let known = vec!["https://example.com/rss".to_string()];
/// assert!(validate_feed_url("https://example.org/rss", &known, false).is_ok());
/// assert_eq!(validate_feed_url("", &known, false), Err(ValidationError::Required));
/// assert!(matches!(
///     validate_feed_url("https://example.com/rss", &known, false),
///     Err(ValidationError::Duplicate(_))
/// ));
/// ```
pub fn validate_feed_url(
    candidate: &str,
    known_urls: &[String],
    allow_private_hosts: bool,
) -> Result<Url, ValidationError> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Err(ValidationError::Required);
    }

    let url = Url::parse(candidate).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ValidationError::Malformed(format!(
                "unsupported scheme: {}",
                scheme
            )))
        }
    }

    let Some(host) = url.host_str() else {
        return Err(ValidationError::Malformed("missing host".to_string()));
    };

    if !allow_private_hosts {
        check_public_host(host)?;
    }

    if known_urls.iter().any(|known| known == candidate) {
        return Err(ValidationError::Duplicate(candidate.to_string()));
    }

    Ok(url)
}

/// Validates a post link before handing it to the system browser.
///
/// Only http(s) links are opened; anything else from a feed document
/// (`javascript:`, `file:`, custom schemes) is refused.
pub fn validate_link_for_open(link: &str) -> Result<Url, ValidationError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(ValidationError::Required);
    }
    let url = Url::parse(link).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ValidationError::Malformed(format!(
            "unsupported scheme: {}",
            scheme
        ))),
    }
}

fn check_public_host(host: &str) -> Result<(), ValidationError> {
    if host.eq_ignore_ascii_case("localhost") {
        return Err(ValidationError::Malformed("localhost not allowed".to_string()));
    }

    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(ValidationError::Malformed(format!(
                "private address not allowed: {}",
                ip
            )));
        }
    }
    Ok(())
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            if v6.is_loopback() || v6.is_unspecified() {
                return true;
            }
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link local
            (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}
