//! Listing of the modules a user makes available.
//!
//! The listing is a line-oriented document: a two-line header followed by
//! one `name: ...` line per module.

use std::sync::Arc;

use crate::config::Config;
use crate::http::HttpClient;
use crate::{NdistrbError, Result};

const HEADER_LINES: usize = 2;

/// Parse a listing document into module names, in order of first appearance
pub fn parse_listing(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for line in text.lines().skip(HEADER_LINES) {
        let name = line.split(':').next().unwrap_or_default().trim();
        if name.is_empty() || names.iter().any(|n| n == name) {
            continue;
        }
        names.push(name.to_string());
    }

    names
}

/// Fetches a user's module listing from the configured endpoint
pub struct ModuleListing {
    http_client: Arc<HttpClient>,
    config: Arc<Config>,
}

impl ModuleListing {
    pub fn new(http_client: Arc<HttpClient>, config: Arc<Config>) -> Self {
        Self { http_client, config }
    }

    /// Names of the modules `user` makes available
    pub async fn fetch(&self, user: &str) -> Result<Vec<String>> {
        let url = self.config.listing_url_for(user);
        log::info!("Fetching {} module list from {}", user, url);

        let text = self
            .http_client
            .get_text(&url)
            .await
            .map_err(|e| NdistrbError::DownloadFailed {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        Ok(parse_listing(&text))
    }
}
