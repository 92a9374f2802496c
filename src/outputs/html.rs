//! Static HTML page generation.
//!
//! The page is self-contained: styling and the small image fallback script
//! are inlined. Article text is escaped. The summary fragment is embedded
//! verbatim since it is already HTML.
//!
//! # Output
//!
//! `save` writes to the given filename, or to
//! `news_page_<YYYYMMDD_HHMMSS>.html`, inside the output directory.

use crate::config::Config;
use crate::error::Result;
use crate::models::{Article, ImageSource, Summary};
use crate::utils::{escape_html, relative_to, timestamped_page_name};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// An article paired with the image resolved for it during this run.
#[derive(Debug, Clone)]
pub struct PageEntry<'a> {
    pub article: &'a Article,
    pub image: ImageSource,
}

#[derive(Debug, Clone)]
pub struct PageRenderer {
    /// Directory the page is written to; local image paths are made
    /// relative to it.
    output_dir: PathBuf,
}

impl PageRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
        }
    }

    /// Render the page with the current local time as its timestamp.
    pub fn render(&self, topic: &str, entries: &[PageEntry<'_>], summary: &Summary) -> String {
        self.render_at(topic, entries, summary, Local::now())
    }

    pub fn render_at(
        &self,
        topic: &str,
        entries: &[PageEntry<'_>],
        summary: &Summary,
        generated: DateTime<Local>,
    ) -> String {
        let topic = escape_html(topic);
        let mut html = String::with_capacity(16 * 1024);

        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>News: {topic}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="container">
<header class="banner">
<h1>{topic}</h1>
<p class="timestamp">Generated on {generated}</p>
</header>
<section class="summary">
<h2>AI Summary</h2>
<div class="summary-content">
{summary}
</div>
</section>
<section class="articles">
<h2>Articles</h2>
"#,
            generated = generated.format("%B %d, %Y at %I:%M %p"),
            summary = summary.to_html(),
        );

        if entries.is_empty() {
            html.push_str(
                "<div class=\"no-articles\"><p>No articles found for this topic. Try a different search term.</p></div>\n",
            );
        } else {
            html.push_str("<div class=\"news-grid\">\n");
            for entry in entries {
                self.write_card(&mut html, entry);
            }
            html.push_str("</div>\n");
        }

        let _ = write!(
            html,
            "</section>\n</div>\n<script>{SCRIPT}</script>\n</body>\n</html>\n"
        );
        html
    }

    fn write_card(&self, html: &mut String, entry: &PageEntry<'_>) {
        let article = entry.article;
        let source = escape_html(&article.source);

        html.push_str("<article class=\"news-item\">\n");
        match self.image_src(&entry.image) {
            Some(src) => {
                let _ = writeln!(
                    html,
                    r#"<div class="news-image"><img src="{src}" alt="{alt}" loading="lazy" data-source="{source}"></div>"#,
                    src = escape_html(&src),
                    alt = escape_html(&article.title),
                );
            }
            None => {
                let _ = writeln!(
                    html,
                    r#"<div class="news-image image-placeholder"><span>{source}</span></div>"#
                );
            }
        }
        let _ = writeln!(
            html,
            r#"<div class="news-content">
<h3 class="news-title"><a href="{link}" target="_blank" rel="noopener noreferrer">{title}</a></h3>
<div class="news-meta"><span class="news-source">{source}</span><span class="news-date">{date}</span></div>
<p class="news-snippet">{snippet}</p>
</div>
</article>"#,
            link = escape_html(&article.link),
            title = escape_html(&article.title),
            date = escape_html(&article.date),
            snippet = escape_html(&article.snippet),
        );
    }

    /// Image reference for the page, if any. Local files are made relative
    /// to the output directory; remote URLs pass through.
    fn image_src(&self, image: &ImageSource) -> Option<String> {
        match image {
            ImageSource::Missing => None,
            ImageSource::Local(path) => {
                let base = std::path::absolute(&self.output_dir).unwrap_or_else(|_| self.output_dir.clone());
                let rel = relative_to(path, &base);
                Some(rel.to_string_lossy().replace('\\', "/"))
            }
            other => Some(other.as_str().into_owned()),
        }
    }

    /// Write `html` and return its path, or `None` if writing failed.
    #[instrument(level = "info", skip(self, html))]
    pub async fn save(&self, html: &str, filename: Option<&str>) -> Option<PathBuf> {
        match self.write_page(html, filename).await {
            Ok(path) => {
                info!(path = %path.display(), bytes = html.len(), "Saved page");
                Some(path)
            }
            Err(e) => {
                error!(error = %e, "Failed to save page");
                None
            }
        }
    }

    /// Write `html` as UTF-8, surfacing I/O errors.
    pub async fn write_page(&self, html: &str, filename: Option<&str>) -> Result<PathBuf> {
        let name = match filename {
            Some(name) => name.to_string(),
            None => timestamped_page_name(Local::now()),
        };
        let path = page_path(&self.output_dir, &name);
        fs::write(&path, html).await?;
        Ok(path)
    }
}

fn page_path(dir: &Path, name: &str) -> PathBuf {
    if dir == Path::new(".") {
        PathBuf::from(name)
    } else {
        dir.join(name)
    }
}

const STYLE: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f0f2f5; color: #1c1e21; line-height: 1.6; }
.container { max-width: 1200px; margin: 0 auto; padding: 24px; }
.banner { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: #fff; padding: 40px 32px; border-radius: 16px; margin-bottom: 32px; text-align: center; }
.banner h1 { font-size: 2.4rem; text-transform: capitalize; }
.timestamp { opacity: 0.85; margin-top: 8px; }
.summary { background: #fff; border-radius: 16px; padding: 28px 32px; margin-bottom: 32px; box-shadow: 0 2px 12px rgba(0,0,0,0.08); }
.summary h2, .articles h2 { margin-bottom: 16px; color: #4a4a8a; }
.summary-content p { margin-bottom: 12px; }
.summary-content ul { margin: 0 0 12px 24px; }
.summary-content h3 { margin: 16px 0 8px; color: #764ba2; }
.news-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(340px, 1fr)); gap: 24px; }
.news-item { background: #fff; border-radius: 12px; overflow: hidden; box-shadow: 0 2px 12px rgba(0,0,0,0.08); display: flex; flex-direction: column; transition: transform 0.2s; }
.news-item:hover { transform: translateY(-4px); }
.news-image { height: 200px; background: #e4e6eb; overflow: hidden; }
.news-image img { width: 100%; height: 100%; object-fit: cover; opacity: 0; transition: opacity 0.3s; }
.news-image img.loaded { opacity: 1; }
.image-placeholder { display: flex; align-items: center; justify-content: center; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: #fff; font-weight: 600; font-size: 1.2rem; padding: 16px; text-align: center; }
.news-content { padding: 20px; display: flex; flex-direction: column; flex: 1; }
.news-title { font-size: 1.1rem; margin-bottom: 8px; }
.news-title a { color: #1c1e21; text-decoration: none; }
.news-title a:hover { color: #667eea; }
.news-meta { display: flex; justify-content: space-between; font-size: 0.85rem; color: #65676b; margin-bottom: 12px; }
.news-source { font-weight: 600; color: #764ba2; }
.news-snippet { color: #444; font-size: 0.95rem; }
.no-articles { background: #fff; border-radius: 12px; padding: 48px; text-align: center; color: #65676b; }
"#;

const SCRIPT: &str = r#"
document.querySelectorAll('.news-image img').forEach(function (img) {
  function placeholder() {
    var box = img.parentElement;
    box.classList.add('image-placeholder');
    var label = document.createElement('span');
    label.textContent = img.dataset.source || 'News';
    box.replaceChildren(label);
  }
  if (img.complete) {
    if (img.naturalWidth > 0) { img.classList.add('loaded'); } else { placeholder(); }
  }
  img.addEventListener('load', function () { img.classList.add('loaded'); });
  img.addEventListener('error', placeholder);
});
"#;
