//! Run configuration.
//!
//! A [`Config`] is built once in `main` from the parsed [`Cli`] (which has
//! already folded in environment variables and `.env`) and then handed by
//! reference to each component's constructor.

use crate::cli::Cli;
use crate::error::{NewsError, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://serpapi.com/search.json";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub serpapi_api_key: String,
    pub google_api_key: String,
    /// Full URL of the SerpAPI `search.json` endpoint.
    pub search_endpoint: String,
    /// Base URL of the Generative Language API, without the model path.
    pub gemini_endpoint: String,
    pub gemini_model: String,
    pub high_res_images: bool,
    pub download_images: bool,
    pub images_dir: PathBuf,
    pub retention_days: u64,
    /// Directory the rendered page is written to.
    pub output_dir: PathBuf,
}

impl Config {
    /// Build a config with default endpoints and the given credentials.
    pub fn new(serpapi_api_key: impl Into<String>, google_api_key: impl Into<String>) -> Self {
        Self {
            serpapi_api_key: serpapi_api_key.into(),
            google_api_key: google_api_key.into(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            gemini_endpoint: DEFAULT_GEMINI_ENDPOINT.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            high_res_images: true,
            download_images: true,
            images_dir: PathBuf::from("news_images"),
            retention_days: 7,
            output_dir: PathBuf::from("."),
        }
    }

    /// Validate credentials and assemble the run configuration.
    ///
    /// Endpoint and model overrides are read from `SERPAPI_ENDPOINT`,
    /// `GEMINI_ENDPOINT` and `GEMINI_MODEL` when set.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let serpapi_api_key = require(cli.serpapi_api_key.as_deref(), "SERPAPI_API_KEY")?;
        let google_api_key = require(cli.google_api_key.as_deref(), "GOOGLE_API_KEY")?;

        let mut config = Self::new(serpapi_api_key, google_api_key);
        if let Ok(endpoint) = env::var("SERPAPI_ENDPOINT") {
            config.search_endpoint = endpoint;
        }
        if let Ok(endpoint) = env::var("GEMINI_ENDPOINT") {
            config.gemini_endpoint = endpoint;
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        config.high_res_images = !cli.no_high_res;
        config.download_images = !cli.no_download;
        config.images_dir = PathBuf::from(&cli.images_dir);
        config.retention_days = cli.retention_days;
        Ok(config)
    }
}

fn require(value: Option<&str>, var: &'static str) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(NewsError::MissingCredential { var }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(serpapi: Option<&str>, google: Option<&str>) -> Cli {
        Cli {
            topic: "rust".to_string(),
            articles: 10,
            output: None,
            no_high_res: true,
            no_download: false,
            images_dir: "imgs".to_string(),
            retention_days: 3,
            serpapi_api_key: serpapi.map(String::from),
            google_api_key: google.map(String::from),
        }
    }

    #[test]
    fn test_from_cli_with_both_keys() {
        let config = Config::from_cli(&cli(Some("serp"), Some("goog"))).unwrap();

        assert_eq!(config.serpapi_api_key, "serp");
        assert_eq!(config.google_api_key, "goog");
        assert!(!config.high_res_images);
        assert!(config.download_images);
        assert_eq!(config.images_dir, PathBuf::from("imgs"));
        assert_eq!(config.retention_days, 3);
    }

    #[test]
    fn test_missing_search_key_is_fatal() {
        let err = Config::from_cli(&cli(None, Some("goog"))).unwrap_err();
        assert!(matches!(
            err,
            NewsError::MissingCredential {
                var: "SERPAPI_API_KEY"
            }
        ));
    }

    #[test]
    fn test_blank_model_key_is_fatal() {
        let err = Config::from_cli(&cli(Some("serp"), Some("   "))).unwrap_err();
        assert!(matches!(
            err,
            NewsError::MissingCredential {
                var: "GOOGLE_API_KEY"
            }
        ));
    }
}
