//! End-to-end run: cleanup → search → summarize → render → save.
//!
//! Each stage degrades on its own, so a run always reaches the save step.
//! Calls are awaited one after another; at most one request is in flight.

use crate::api::GeminiClient;
use crate::config::Config;
use crate::error::Result;
use crate::images::ImageResolver;
use crate::models::RunReport;
use crate::outputs::html::{PageEntry, PageRenderer};
use crate::search::Searcher;
use crate::summarize::Summarizer;
use reqwest::Client;
use std::time::Instant;
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub struct NewsAgent {
    searcher: Searcher,
    images: ImageResolver,
    summarizer: Summarizer<GeminiClient>,
    renderer: PageRenderer,
    download_images: bool,
    retention_days: u64,
}

impl NewsAgent {
    /// Wire every component from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().build()?;
        let searcher = Searcher::new(config, client.clone());
        Ok(Self {
            images: ImageResolver::new(config, searcher.clone())?,
            searcher,
            summarizer: Summarizer::new(GeminiClient::new(config, client)),
            renderer: PageRenderer::new(config),
            download_images: config.download_images,
            retention_days: config.retention_days,
        })
    }

    /// Produce the page for `topic` and report where it was written.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, topic: &str, count: u32, output_file: Option<&str>) -> RunReport {
        let t0 = Instant::now();
        info!("Starting news run");

        if self.download_images {
            self.images.cleanup_old_images(self.retention_days).await;
        }

        let articles = self.searcher.fetch_news(topic, count).await;

        let summary = self.summarizer.summarize(topic, &articles).await;
        if summary.is_degraded() {
            warn!(kind = summary.kind(), "Using degraded summary");
        }

        let mut entries = Vec::with_capacity(articles.len());
        for article in &articles {
            let image = self.images.resolve(article).await;
            entries.push(PageEntry { article, image });
        }
        let with_images = entries.iter().filter(|e| !e.image.is_missing()).count();
        info!(articles = entries.len(), with_images, "Resolved article images");

        let html = self.renderer.render(topic, &entries, &summary);
        let path = self.renderer.save(&html, output_file).await;

        let elapsed = t0.elapsed();
        info!(
            ?elapsed,
            article_count = articles.len(),
            path = ?path,
            "Run complete"
        );

        RunReport {
            path,
            article_count: articles.len(),
            summary_degraded: summary.is_degraded(),
        }
    }
}
