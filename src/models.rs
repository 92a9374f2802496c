//! Data models for news articles and the outcomes of each pipeline stage.
//!
//! - [`Article`]: one normalized news search result
//! - [`ImageSource`]: where an article's illustrative image came from
//! - [`Summary`]: the HTML summary, or the reason a degraded one was produced
//! - [`RunReport`]: what a completed run wrote
//!
//! Upstream search responses are treated as untyped JSON. Fields are read
//! with type checks and never assumed to have a particular shape.

use serde_json::Value;
use std::path::PathBuf;

pub const NO_TITLE: &str = "No title";
pub const NO_LINK: &str = "#";
pub const NO_SNIPPET: &str = "No description available";
pub const NO_DATE: &str = "Unknown date";
pub const NO_SOURCE: &str = "Unknown source";

/// A normalized news article.
///
/// Text fields are never empty: missing values are replaced with the
/// placeholder constants above. Image fields keep whatever the search API
/// supplied and are validated later by the image resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub date: String,
    pub source: String,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub image_url: Option<String>,
    /// `media.image` from the raw result, as a string or `{ "url": ... }`.
    pub media_image: Option<String>,
}

impl Article {
    /// Normalize one entry of a `news_results` array.
    ///
    /// `source` may arrive as a plain string or as an object carrying a
    /// `name`; both are accepted.
    pub fn from_news_result(raw: &Value) -> Self {
        let source = text_field(raw, "source")
            .or_else(|| raw.get("source").and_then(|s| text_field(s, "name")));

        let media_image = raw.get("media").and_then(|media| {
            let image = media.get("image")?;
            non_empty(image.as_str()).or_else(|| text_field(image, "url"))
        });

        Self {
            title: text_field(raw, "title").unwrap_or_else(|| NO_TITLE.to_string()),
            link: text_field(raw, "link").unwrap_or_else(|| NO_LINK.to_string()),
            snippet: text_field(raw, "snippet").unwrap_or_else(|| NO_SNIPPET.to_string()),
            date: text_field(raw, "date").unwrap_or_else(|| NO_DATE.to_string()),
            source: source.unwrap_or_else(|| NO_SOURCE.to_string()),
            image: text_field(raw, "image"),
            thumbnail: text_field(raw, "thumbnail"),
            image_url: text_field(raw, "image_url"),
            media_image,
        }
    }

    /// The article's own image URLs in fallback priority order.
    pub fn image_candidates(&self) -> impl Iterator<Item = &str> {
        [
            &self.image,
            &self.thumbnail,
            &self.image_url,
            &self.media_image,
        ]
        .into_iter()
        .filter_map(|candidate| candidate.as_deref())
    }

    /// Query for a high-resolution image search, if the article has a real
    /// title and source.
    pub fn image_query(&self) -> Option<String> {
        if self.title == NO_TITLE || self.source == NO_SOURCE {
            return None;
        }
        Some(format!("{} {}", self.title, self.source))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read `key` from a JSON object as a non-empty, trimmed string.
pub(crate) fn text_field(value: &Value, key: &str) -> Option<String> {
    non_empty(value.get(key).and_then(Value::as_str))
}

/// The image chosen for an article, tagged with how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A full-size image from the secondary image search.
    HighRes(String),
    /// An image URL bundled with the news result.
    Article(String),
    /// A copy saved to the local images directory.
    Local(PathBuf),
    /// Download failed; the remote URL is used as-is.
    RemoteFallback(String),
    Missing,
}

impl ImageSource {
    /// The resolved image as a URL or path string; empty when missing.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            ImageSource::HighRes(url)
            | ImageSource::Article(url)
            | ImageSource::RemoteFallback(url) => url.as_str().into(),
            ImageSource::Local(path) => path.to_string_lossy(),
            ImageSource::Missing => "".into(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ImageSource::Missing)
    }
}

/// The outcome of summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// Structured HTML produced by the primary prompt.
    Generated(String),
    /// Output of the simplified retry prompt.
    Simplified(String),
    /// There was nothing to summarize; the model was not called.
    NoArticles,
    /// Both prompts failed.
    Failed { reason: String, article_count: usize },
}

pub const NO_NEWS_SUMMARY: &str = "No recent news articles were found for this topic.";

impl Summary {
    /// HTML fragment to embed in the page.
    pub fn to_html(&self) -> String {
        match self {
            Summary::Generated(html) | Summary::Simplified(html) => html.clone(),
            Summary::NoArticles => NO_NEWS_SUMMARY.to_string(),
            Summary::Failed {
                reason,
                article_count,
            } => format!(
                "Unable to generate summary due to error: {reason}. Found {article_count} articles."
            ),
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Summary::Generated(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Summary::Generated(_) => "generated",
            Summary::Simplified(_) => "simplified",
            Summary::NoArticles => "no_articles",
            Summary::Failed { .. } => "failed",
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Path of the written page; `None` when saving failed.
    pub path: Option<PathBuf>,
    pub article_count: usize,
    pub summary_degraded: bool,
}
