//! Archive fetching and extraction.
//!
//! Modules are distributed as gzip-compressed tarballs with a single
//! top-level wrapper directory. The fetcher retrieves the raw bytes, the
//! extractor unpacks them with that wrapper stripped.

mod archive;
mod file;

pub use archive::ArchiveExtractor;
pub use file::{archive_url, ArchiveFetcher, HttpFetcher};
