//! Command-line interface definitions for News Page.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! API keys are normally supplied through the environment (or a `.env` file)
//! but can also be passed as flags.

use clap::Parser;

/// Command-line arguments for the News Page application.
///
/// # Examples
///
/// ```sh
/// news_page "artificial intelligence" --articles 15
/// news_page "climate change" -a 20 -o climate_news.html
/// news_page "space exploration" --no-high-res --no-download
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch and analyze news on any topic")]
pub struct Cli {
    /// News topic to search for
    pub topic: String,

    /// Number of articles to fetch
    #[arg(short = 'a', long = "articles", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub articles: u32,

    /// Output filename (default: auto-generated with timestamp)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Disable high-resolution image search (faster)
    #[arg(long)]
    pub no_high_res: bool,

    /// Don't download images locally (use remote URLs)
    #[arg(long)]
    pub no_download: bool,

    /// Directory where downloaded images are stored
    #[arg(long, default_value = "news_images")]
    pub images_dir: String,

    /// Delete downloaded images older than this many days
    #[arg(long, default_value_t = 7)]
    pub retention_days: u64,

    /// SerpAPI key used for news and image search
    #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
    pub serpapi_api_key: Option<String>,

    /// Google API key used for the Gemini summary
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,
}
