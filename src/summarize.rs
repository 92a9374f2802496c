//! AI summary of the fetched articles.
//!
//! One structured prompt is sent first. If it fails, a plain prompt is tried
//! once. If that also fails the result is [`Summary::Failed`], which renders
//! as a sentence naming the error and the article count.

use crate::api::AskAsync;
use crate::models::{Article, Summary};
use crate::utils::strip_code_fences;
use std::fmt::Write;
use tracing::{error, info, instrument, warn};

#[derive(Debug)]
pub struct Summarizer<M> {
    model: M,
}

impl<M: AskAsync> Summarizer<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Summarize `articles` about `topic`.
    #[instrument(level = "info", skip(self, articles), fields(count = articles.len()))]
    pub async fn summarize(&self, topic: &str, articles: &[Article]) -> Summary {
        if articles.is_empty() {
            info!("No articles; skipping model call");
            return Summary::NoArticles;
        }

        let digest = article_digest(articles);
        let first_error = match self.model.ask(&analysis_prompt(topic, &digest)).await {
            Ok(text) => return Summary::Generated(strip_code_fences(&text)),
            Err(e) => e,
        };
        warn!(error = %first_error, "Structured summary failed; retrying with simple prompt");

        match self.model.ask(&simple_prompt(topic, &digest)).await {
            Ok(text) => Summary::Simplified(strip_code_fences(&text)),
            Err(e) => {
                error!(error = %e, "Simple summary failed");
                Summary::Failed {
                    reason: e.to_string(),
                    article_count: articles.len(),
                }
            }
        }
    }
}

/// Numbered block listing each article's title, source, snippet and date.
pub fn article_digest(articles: &[Article]) -> String {
    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        let _ = writeln!(out, "Article {}:", i + 1);
        let _ = writeln!(out, "Title: {}", article.title);
        let _ = writeln!(out, "Source: {}", article.source);
        let _ = writeln!(out, "Summary: {}", article.snippet);
        let _ = writeln!(out, "Date: {}", article.date);
        out.push('\n');
    }
    out
}

pub fn analysis_prompt(topic: &str, digest: &str) -> String {
    format!(
        r#"Analyze the following recent news articles about "{topic}" and write a summary formatted as HTML.

Use this structure:
1. A short overview paragraph in a <p> element.
2. A <ul> bulleted list of 3-4 key points, using <strong> or <em> to highlight the important terms.
3. An <h3>Key Insights</h3> heading followed by a paragraph analysing trends, implications and what to watch next.

Keep the summary between 200 and 300 words. Return only the HTML fragment: no <html>, <head> or <body> tags and no Markdown.

Articles:
{digest}"#
    )
}

pub fn simple_prompt(topic: &str, digest: &str) -> String {
    format!(
        "Summarize these news articles about \"{topic}\" in about 200 words.\n\n{digest}"
    )
}
