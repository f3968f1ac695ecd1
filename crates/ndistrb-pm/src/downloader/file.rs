//! Archive fetcher for HTTP/HTTPS tarballs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::HttpClient;
use crate::{NdistrbError, Result};

/// Build the tarball URL for `user/module` at `version`.
///
/// Parts are interpolated as-is; callers are expected to pass validated
/// names (see [`crate::ModuleRequest::new`]).
pub fn archive_url(host: &str, user: &str, module: &str, version: &str) -> String {
    format!("https://{}/{}/{}/tarball/{}", host, user, module, version)
}

/// Retrieves the raw bytes of an archive.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Fetch the complete body at `url`, or fail.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Fetcher backed by the shared HTTP client
pub struct HttpFetcher {
    http_client: Arc<HttpClient>,
}

impl HttpFetcher {
    /// Create a new fetcher
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.http_client
            .download_bytes(url)
            .await
            .map_err(|e| NdistrbError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}
