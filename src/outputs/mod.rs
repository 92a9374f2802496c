//! Output generation.
//!
//! # Submodules
//!
//! - [`html`]: renders the summary and article cards into a static page
//!
//! # Output Structure
//!
//! ```text
//! working_dir/
//! ├── news_page_20250506_203005.html
//! └── news_images/
//!     ├── Rocket_lands_1a2b3c4d.jpg
//!     └── Probe_arrives_9f8e7d6c.png
//! ```

pub mod html;
