pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod installer;
pub mod package;
pub mod repository;

pub use error::{NdistrbError, Result};
pub use package::{ModulePaths, ModuleRequest, DEFAULT_VERSION};
pub use config::Config;
pub use cli::{Output, Reporter};
pub use downloader::{ArchiveExtractor, ArchiveFetcher, HttpFetcher};
pub use installer::{HookRunner, InstallOutcome, ModuleInstaller, Resolution, VersionMarker};
pub use repository::ModuleListing;
