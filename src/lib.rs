//! # News Page
//!
//! Fetches recent news for a topic, picks an image for each article,
//! asks an LLM for an HTML summary, and writes everything to a static page.
//!
//! ## Architecture
//!
//! The pipeline runs strictly in sequence:
//! 1. **Cleanup**: delete downloaded images past their retention window
//! 2. **Search**: one SerpAPI news query for the topic
//! 3. **Summarize**: one Gemini call, with a single simplified retry
//! 4. **Images**: high-res image search and optional download per article
//! 5. **Render & save**: one self-contained HTML file
//!
//! Every stage after configuration degrades to a fallback result instead of
//! failing the run.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod images;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod search;
pub mod summarize;
pub mod utils;

pub use config::Config;
pub use error::{NewsError, Result};
pub use models::{Article, ImageSource, RunReport, Summary};
pub use pipeline::NewsAgent;
