//! Configuration for ndistrb.
//!
//! Values are merged from three sources, highest priority first:
//!
//! 1. Environment variables (`NDISTRB_*`, plus `EDITOR`)
//! 2. The project file `<root>/ndistrb.toml`
//! 3. Built-in defaults
//!
//! The project root itself is never read from a global; it is passed in by
//! the caller and carried by [`Config`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ndistrb_pm::config::Config;
//! use std::path::Path;
//!
//! let config = Config::build(Path::new("/path/to/project"), true).unwrap();
//! println!("Project root: {:?}", config.root());
//! println!("Listing for acme: {}", config.listing_url_for("acme"));
//! ```

mod config;
mod source;

pub use config::Config;
pub use source::{ConfigLoader, ConfigSource, RawConfig, PROJECT_CONFIG_FILE};
