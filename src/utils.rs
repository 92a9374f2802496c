//! Utility functions for string handling, file naming and paths.
//!
//! - String truncation for logging
//! - HTML escaping for article text
//! - Filesystem-safe names and content hashes for downloaded images
//! - Path rewriting for page-relative image references

use chrono::{DateTime, Local};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// True if `url` uses the `http` or `https` scheme.
pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reduce a title to a filename stem.
///
/// Keeps alphanumerics, spaces, hyphens and underscores, trims surrounding
/// whitespace, and cuts to 50 characters. Spaces become underscores.
pub fn safe_filename_stem(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim()
        .chars()
        .take(50)
        .collect::<String>()
        .trim_end()
        .replace(' ', "_")
}

/// First eight hex digits of the SHA-256 of `url`.
pub fn url_hash8(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").unwrap());

/// Unwrap a Markdown code fence around model output, if present.
pub fn strip_code_fences(s: &str) -> String {
    match CODE_FENCE.captures(s) {
        Some(caps) => caps[1].trim().to_string(),
        None => s.trim().to_string(),
    }
}

/// Express `path` relative to `base` when it lies under it.
///
/// Relative paths are returned unchanged; absolute paths outside `base`
/// are returned as-is.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    if path.is_relative() {
        return path.to_path_buf();
    }
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Default page filename: `news_page_<YYYYMMDD_HHMMSS>.html`.
pub fn timestamped_page_name(now: DateTime<Local>) -> String {
    format!("news_page_{}.html", now.format("%Y%m%d_%H%M%S"))
}
