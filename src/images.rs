//! Image resolution, download and retention cleanup.
//!
//! For each article the resolver tries, in order:
//! 1. a high-resolution image search on `"{title} {source}"` (if enabled),
//! 2. the article's own `image`, `thumbnail`, `image_url`, `media.image`,
//!
//! and stops at the first acceptable HTTP(S) URL. If downloading is enabled
//! the chosen URL is saved under the images directory; a failed download
//! falls back to the remote URL.

use crate::config::Config;
use crate::error::{NewsError, Result};
use crate::models::{Article, ImageSource};
use crate::search::Searcher;
use crate::utils::{is_http_url, safe_filename_stem, url_hash8};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// URL fragments that mark a search result as a small thumbnail.
pub const THUMBNAIL_MARKERS: [&str; 4] = ["92x92", "100x100", "120x120", "150x150"];

/// How many image search results to inspect per article.
const IMAGE_SEARCH_LIMIT: usize = 5;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

const KNOWN_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

/// Files removed and files that could not be removed by a cleanup sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ImageResolver {
    searcher: Searcher,
    download_client: Client,
    images_dir: PathBuf,
    high_res_enabled: bool,
    download_enabled: bool,
}

impl ImageResolver {
    pub fn new(config: &Config, searcher: Searcher) -> Result<Self> {
        let download_client = Client::builder()
            .connect_timeout(DOWNLOAD_TIMEOUT)
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            searcher,
            download_client,
            images_dir: config.images_dir.clone(),
            high_res_enabled: config.high_res_images,
            download_enabled: config.download_images,
        })
    }

    /// Choose an image for `article`, downloading it if configured to.
    #[instrument(level = "info", skip_all, fields(title = %article.title))]
    pub async fn resolve(&self, article: &Article) -> ImageSource {
        let chosen = match self.find_high_res(article).await {
            Some(url) => ImageSource::HighRes(url),
            None => match article_image(article) {
                Some(url) => ImageSource::Article(url.to_string()),
                None => {
                    debug!("No image available");
                    return ImageSource::Missing;
                }
            },
        };

        if !self.download_enabled {
            return chosen;
        }

        let url = chosen.as_str().into_owned();
        match self.download(&url, &article.title).await {
            Ok(path) => ImageSource::Local(path),
            Err(e) => {
                warn!(%url, error = %e, "Image download failed; using remote URL");
                ImageSource::RemoteFallback(url)
            }
        }
    }

    async fn find_high_res(&self, article: &Article) -> Option<String> {
        if !self.high_res_enabled {
            return None;
        }
        let query = article.image_query()?;
        match self.searcher.search_images(&query, IMAGE_SEARCH_LIMIT).await {
            Ok(urls) => {
                let found = select_high_res(&urls).map(str::to_string);
                if found.is_none() {
                    debug!(%query, candidates = urls.len(), "No high-res candidate");
                }
                found
            }
            Err(e) => {
                warn!(%query, error = %e, "High-res image search failed");
                None
            }
        }
    }

    /// Download `url` into the images directory and return the local path.
    ///
    /// The filename is derived from the title and a hash of the URL, so an
    /// existing file with the same name is reused without fetching again.
    pub async fn download(&self, url: &str, title: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.images_dir).await?;

        let stem = image_file_stem(title, url);
        if let Some(ext) = extension_from_url(url) {
            let path = self.images_dir.join(format!("{stem}.{ext}"));
            if fs::try_exists(&path).await? {
                debug!(path = %path.display(), "Reusing downloaded image");
                return Ok(path);
            }
        }

        let response = self.download_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                status: status.as_u16(),
                body: format!("image download from {url}"),
            });
        }

        let ext = extension_from_url(url).unwrap_or_else(|| {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            extension_from_content_type(content_type)
        });
        let bytes = response.bytes().await?;

        let path = self.images_dir.join(format!("{stem}.{ext}"));
        fs::write(&path, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "Downloaded image");
        Ok(path)
    }

    /// Delete downloaded images older than `retention_days`.
    pub async fn cleanup_old_images(&self, retention_days: u64) -> CleanupReport {
        cleanup_old_images(&self.images_dir, retention_days).await
    }
}

/// First search result that is an HTTP(S) URL without a thumbnail marker.
pub fn select_high_res(urls: &[String]) -> Option<&str> {
    urls.iter()
        .map(String::as_str)
        .find(|url| {
            let lower = url.to_ascii_lowercase();
            is_http_url(url) && !THUMBNAIL_MARKERS.iter().any(|m| lower.contains(m))
        })
}

/// First HTTP(S) image URL carried by the article itself.
pub fn article_image(article: &Article) -> Option<&str> {
    article.image_candidates().find(|url| is_http_url(url))
}

/// `{safe title}_{hash8}`, or just the hash when the title has no usable
/// characters.
pub fn image_file_stem(title: &str, url: &str) -> String {
    let stem = safe_filename_stem(title);
    let hash = url_hash8(url);
    if stem.is_empty() {
        hash
    } else {
        format!("{stem}_{hash}")
    }
}

/// Image extension from the URL path, if it is a recognised one.
pub fn extension_from_url(url: &str) -> Option<&'static str> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let (_, ext) = segment.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    KNOWN_EXTENSIONS.iter().copied().find(|known| *known == ext)
}

/// Image extension for a `Content-Type` value, defaulting to `jpg`.
pub fn extension_from_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        _ => "jpg",
    }
}

/// Delete every file in `dir` whose modification time is older than
/// `retention_days`. Missing directories and undeletable files are not
/// errors.
#[instrument(level = "info", skip(dir), fields(dir = %dir.display()))]
pub async fn cleanup_old_images(dir: &Path, retention_days: u64) -> CleanupReport {
    let mut report = CleanupReport::default();
    let retention = Duration::from_secs(retention_days.saturating_mul(86_400));
    let Some(cutoff) = SystemTime::now().checked_sub(retention) else {
        return report;
    };

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return report,
        Err(e) => {
            warn!(error = %e, "Could not read images directory");
            return report;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Could not read directory entry");
                break;
            }
        };
        let path = entry.path();
        let modified = match entry.metadata().await {
            Ok(meta) if meta.is_file() => meta.modified(),
            Ok(_) => continue,
            Err(e) => Err(e),
        };
        match modified {
            Ok(mtime) if mtime < cutoff => match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed old image");
                    report.removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not remove old image");
                    report.failed += 1;
                }
            },
            Ok(_) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read image metadata");
                report.failed += 1;
            }
        }
    }

    info!(removed = report.removed, failed = report.failed, "Image cleanup finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn article(raw: serde_json::Value) -> Article {
        Article::from_news_result(&raw)
    }

    fn config(server: &MockServer, dir: &TempDir, high_res: bool, download: bool) -> Config {
        let mut config = Config::new("serp", "goog");
        config.search_endpoint = server.url("/search.json");
        config.images_dir = dir.path().join("images");
        config.high_res_images = high_res;
        config.download_images = download;
        config
    }

    fn set_age(path: &Path, days: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(days * 86_400);
        file.set_modified(mtime).unwrap();
    }

    #[test]
    fn test_select_high_res_skips_thumbnails() {
        let urls = vec![
            "x-raw-image:///abc".to_string(),
            "https://img.example.com/92x92/a.jpg".to_string(),
            "https://img.example.com/full/b.jpg".to_string(),
        ];
        assert_eq!(select_high_res(&urls), Some("https://img.example.com/full/b.jpg"));

        let only_thumbs = vec![
            "https://img.example.com/a_150x150.jpg".to_string(),
            "https://img.example.com/92X92/b.jpg".to_string(),
            "https://img.example.com/c_120X120.PNG".to_string(),
        ];
        assert_eq!(select_high_res(&only_thumbs), None);
    }

    #[test]
    fn test_article_image_skips_non_http() {
        let a = article(json!({
            "image": "data:image/gif;base64,R0lGOD",
            "thumbnail": "",
            "image_url": "https://example.com/c.png"
        }));
        assert_eq!(article_image(&a), Some("https://example.com/c.png"));
        assert_eq!(article_image(&article(json!({}))), None);
    }

    #[test]
    fn test_image_file_stem_deterministic() {
        let a = image_file_stem("Moon landing!", "https://x/a.jpg");
        assert_eq!(a, image_file_stem("Moon landing!", "https://x/a.jpg"));
        assert!(a.starts_with("Moon_landing_"));
        assert_ne!(a, image_file_stem("Moon landing!", "https://x/b.jpg"));
        assert_eq!(image_file_stem("!!!", "https://x/a.jpg").len(), 8);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(extension_from_url("https://x/a/photo.PNG?w=1"), Some("png"));
        assert_eq!(extension_from_url("https://x/a/photo"), None);
        assert_eq!(extension_from_url("https://x/a/file.php"), None);
        assert_eq!(extension_from_content_type("image/webp; charset=binary"), "webp");
        assert_eq!(extension_from_content_type("application/octet-stream"), "jpg");
        assert_eq!(extension_from_content_type(""), "jpg");
    }

    #[tokio::test]
    async fn test_resolve_without_high_res_uses_article_field() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(GET).path("/search.json");
            then.status(200).json_body(json!({ "images_results": [] }));
        });
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir, false, false);
        let searcher = Searcher::new(&config, Client::new());
        let resolver = ImageResolver::new(&config, searcher).unwrap();

        let a = article(json!({
            "title": "Mars", "source": "NASA",
            "thumbnail": "https://example.com/t.jpg"
        }));
        let resolved = resolver.resolve(&a).await;

        assert_eq!(resolved, ImageSource::Article("https://example.com/t.jpg".to_string()));
        search.assert_hits(0);
    }

    #[tokio::test]
    async fn test_resolve_high_res_then_fallback() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search.json").query_param("q", "Mars NASA");
            then.status(200).json_body(json!({
                "images_results": [
                    { "original": "https://img.example.com/92x92/a.jpg" },
                    { "original": "https://img.example.com/full.jpg" }
                ]
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/search.json").query_param("q", "Venus ESA");
            then.status(500);
        });
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir, true, false);
        let searcher = Searcher::new(&config, Client::new());
        let resolver = ImageResolver::new(&config, searcher).unwrap();

        let mars = article(json!({ "title": "Mars", "source": "NASA" }));
        assert_eq!(
            resolver.resolve(&mars).await,
            ImageSource::HighRes("https://img.example.com/full.jpg".to_string())
        );

        let venus = article(json!({
            "title": "Venus", "source": "ESA",
            "image": "https://example.com/venus.jpg"
        }));
        assert_eq!(
            resolver.resolve(&venus).await,
            ImageSource::Article("https://example.com/venus.jpg".to_string())
        );

        let bare = article(json!({ "title": "Venus", "source": "ESA" }));
        assert_eq!(resolver.resolve(&bare).await, ImageSource::Missing);
    }

    #[tokio::test]
    async fn test_resolve_ignores_search_thumbnails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search.json").query_param("tbm", "isch");
            then.status(200).json_body(json!({
                "images_results": [
                    { "thumbnail": "https://encrypted-tbn0.gstatic.com/images?q=tbn:abc" }
                ]
            }));
        });
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir, true, false);
        let searcher = Searcher::new(&config, Client::new());
        let resolver = ImageResolver::new(&config, searcher).unwrap();

        let a = article(json!({
            "title": "Harbor reopens", "source": "Coast Daily",
            "image": "https://news.example.com/full-size-hero.jpg"
        }));
        assert_eq!(
            resolver.resolve(&a).await,
            ImageSource::Article("https://news.example.com/full-size-hero.jpg".to_string())
        );
    }

    #[tokio::test]
    async fn test_download_saves_local_copy() {
        let server = MockServer::start();
        let image = server.mock(|when, then| {
            when.method(GET).path("/pics/rocket");
            then.status(200)
                .header("Content-Type", "image/png")
                .body(vec![0x89, b'P', b'N', b'G']);
        });
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir, false, true);
        let searcher = Searcher::new(&config, Client::new());
        let resolver = ImageResolver::new(&config, searcher).unwrap();

        let url = server.url("/pics/rocket");
        let a = article(json!({ "title": "Rocket launch", "image": url }));
        let resolved = resolver.resolve(&a).await;

        let ImageSource::Local(path) = resolved else {
            panic!("expected local image, got {resolved:?}");
        };
        assert!(path.starts_with(dir.path().join("images")));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, b'P', b'N', b'G']);
        image.assert_hits(1);
    }

    #[tokio::test]
    async fn test_download_reuses_existing_file() {
        let server = MockServer::start();
        let image = server.mock(|when, then| {
            when.method(GET).path("/pics/a.jpg");
            then.status(200).body("jpeg");
        });
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir, false, true);
        let searcher = Searcher::new(&config, Client::new());
        let resolver = ImageResolver::new(&config, searcher).unwrap();

        let url = server.url("/pics/a.jpg");
        let first = resolver.download(&url, "Same title").await.unwrap();
        let second = resolver.download(&url, "Same title").await.unwrap();

        assert_eq!(first, second);
        image.assert_hits(1);
    }

    #[tokio::test]
    async fn test_download_failure_falls_back_to_remote() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.jpg");
            then.status(404);
        });
        let dir = TempDir::new().unwrap();
        let config = config(&server, &dir, false, true);
        let searcher = Searcher::new(&config, Client::new());
        let resolver = ImageResolver::new(&config, searcher).unwrap();

        let url = server.url("/missing.jpg");
        let a = article(json!({ "title": "Gone", "image": url.clone() }));

        assert_eq!(resolver.resolve(&a).await, ImageSource::RemoteFallback(url));
    }

    #[tokio::test]
    async fn test_cleanup_respects_retention() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("old.jpg");
        let recent = dir.path().join("recent.jpg");
        std::fs::write(&old, b"old").unwrap();
        std::fs::write(&recent, b"recent").unwrap();
        set_age(&old, 8);
        set_age(&recent, 6);

        let report = cleanup_old_images(dir.path(), 7).await;

        assert_eq!(report, CleanupReport { removed: 1, failed: 0 });
        assert!(!old.exists());
        assert!(recent.exists());
    }

    #[tokio::test]
    async fn test_cleanup_missing_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        let report = cleanup_old_images(&dir.path().join("nope"), 7).await;
        assert_eq!(report, CleanupReport::default());
    }
}
