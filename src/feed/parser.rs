use crate::state::ErrorKind;
use crate::util::sanitize_line;
use feed_rs::parser;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not RSS, Atom or JSON Feed.
    #[error("Not a valid feed: {0}")]
    NotAFeed(String),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidResource
    }
}

/// Channel-level metadata of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChannel {
    pub title: String,
    pub description: String,
}

/// One entry of a parsed document, before the store assigns ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPost {
    pub title: String,
    pub description: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFeed {
    pub feed: ParsedChannel,
    /// Entries in document order.
    pub posts: Vec<ParsedPost>,
}

/// Parses an RSS/Atom/JSON Feed document.
///
/// Text fields are flattened to a single clean line. A missing title becomes
/// "Untitled"; missing descriptions and links become empty strings.
pub fn parse_feed(document: &str) -> Result<ParsedFeed, ParseError> {
    let feed = parser::parse(document.as_bytes()).map_err(|e| ParseError::NotAFeed(e.to_string()))?;

    let channel = ParsedChannel {
        title: text_or(feed.title.map(|t| t.content), "Untitled"),
        description: text_or(feed.description.map(|t| t.content), ""),
    };

    let posts = feed
        .entries
        .into_iter()
        .map(|entry| {
            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body));
            ParsedPost {
                title: text_or(entry.title.map(|t| t.content), "Untitled"),
                description: text_or(description, ""),
                link: entry
                    .links
                    .into_iter()
                    .next()
                    .map(|l| l.href.trim().to_string())
                    .unwrap_or_default(),
            }
        })
        .collect();

    Ok(ParsedFeed {
        feed: channel,
        posts,
    })
}

fn text_or(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) => {
            let clean = sanitize_line(&v);
            if clean.is_empty() {
                fallback.to_string()
            } else {
                clean.into_owned()
            }
        }
        None => fallback.to_string(),
    }
}
