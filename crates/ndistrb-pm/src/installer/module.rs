//! Module installer - decides whether a module needs installing and runs the
//! fetch, extract, build, record pipeline when it does.
//!
//! The decision is made from the filesystem alone:
//!
//! | destination | marker            | outcome                      |
//! |-------------|-------------------|------------------------------|
//! | absent      | -                 | install                      |
//! | present     | equals request    | already installed            |
//! | present     | differs           | outdated, nothing changes    |
//! | present     | absent            | version unknown, nothing changes |
//!
//! An existing install is never modified. Upgrading means removing the
//! module directory by hand and running the installer again.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::Reporter;
use crate::downloader::{archive_url, ArchiveExtractor, ArchiveFetcher};
use crate::package::{ModulePaths, ModuleRequest, DEFAULT_VERSION, MODULES_DIR};
use crate::Result;

use super::hooks::{BuildHooks, HookContext};
use super::marker::VersionMarker;

/// What should happen for a request, given what is on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing on disk; install the requested version
    Install,
    /// Installed at exactly the requested version
    AlreadyInstalled { version: String },
    /// Installed at a different version
    Outdated { installed: String, requested: String },
    /// Directory present but no marker; the version cannot be verified
    VersionUnknown { requested: String },
}

/// Result of [`ModuleInstaller::install`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { version: String, path: PathBuf },
    AlreadyInstalled { version: String },
    Outdated { installed: String, requested: String },
    VersionUnknown { requested: String },
}

/// Installs modules into `<root>/modules`
pub struct ModuleInstaller {
    root: PathBuf,
    host: String,
    fetcher: Arc<dyn ArchiveFetcher>,
    hooks: Arc<dyn BuildHooks>,
    reporter: Arc<dyn Reporter>,
}

impl ModuleInstaller {
    /// Create a new module installer
    pub fn new(
        root: impl Into<PathBuf>,
        host: impl Into<String>,
        fetcher: Arc<dyn ArchiveFetcher>,
        hooks: Arc<dyn BuildHooks>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            root: root.into(),
            host: host.into(),
            fetcher,
            hooks,
            reporter,
        }
    }

    /// Paths of `request`'s module
    pub fn paths(&self, request: &ModuleRequest) -> ModulePaths {
        ModulePaths::new(&self.root, &request.name)
    }

    /// Archive URL for `request`
    pub fn archive_url(&self, request: &ModuleRequest) -> String {
        archive_url(&self.host, &request.user, &request.name, request.requested_version())
    }

    /// Decide what to do for `request` without touching anything.
    pub fn resolve(&self, request: &ModuleRequest) -> Result<Resolution> {
        let paths = self.paths(request);
        let requested = request.requested_version();

        if !paths.destination().exists() {
            return Ok(Resolution::Install);
        }

        let resolution = match VersionMarker::read(&paths.marker())? {
            Some(installed) if installed == requested => Resolution::AlreadyInstalled { version: installed },
            Some(installed) => Resolution::Outdated {
                installed,
                requested: requested.to_string(),
            },
            // A marker-less directory is never installed over, whether or
            // not a specific version was asked for.
            None => Resolution::VersionUnknown {
                requested: requested.to_string(),
            },
        };

        log::debug!("Resolved {} to {:?}", request.name, resolution);
        Ok(resolution)
    }

    /// Install `request` if nothing is on disk, otherwise report how the
    /// existing install relates to the request.
    pub async fn install(&self, request: &ModuleRequest) -> Result<InstallOutcome> {
        let name = &request.name;

        match self.resolve(request)? {
            Resolution::Install => self.run_pipeline(request).await,
            Resolution::AlreadyInstalled { version } => {
                self.reporter.report(&format!("already installed {} {}", name, version));
                Ok(InstallOutcome::AlreadyInstalled { version })
            }
            Resolution::Outdated { installed, requested } => {
                self.reporter.report(&format!(
                    "outdated module {} {} (requested {})",
                    name, installed, requested
                ));
                self.reporter.report(&self.remediation(request));
                Ok(InstallOutcome::Outdated { installed, requested })
            }
            Resolution::VersionUnknown { requested } => {
                self.reporter.report(&format!("already installed {}, but version is unknown", name));
                self.reporter.report(&self.remediation(request));
                Ok(InstallOutcome::VersionUnknown { requested })
            }
        }
    }

    /// Fetch, extract, build, record. The marker is written last, and only
    /// when every earlier stage succeeded.
    async fn run_pipeline(&self, request: &ModuleRequest) -> Result<InstallOutcome> {
        let paths = self.paths(request);
        let version = request.requested_version();
        let url = self.archive_url(request);

        self.reporter.report(&format!("installing {} {}", request.name, version));

        log::info!("Fetching {}", url);
        let bytes = self.fetcher.fetch(&url).await?;

        log::info!("Extracting {} bytes into {}", bytes.len(), paths.destination().display());
        ArchiveExtractor::extract(&bytes, paths.destination())?;

        let ctx = HookContext::new(&self.root, paths.destination(), request);
        self.hooks.run(&ctx).await?;

        VersionMarker::write(&paths.marker(), version)?;

        self.reporter.report(&format!("installed {} {}", request.name, version));
        Ok(InstallOutcome::Installed {
            version: version.to_string(),
            path: paths.destination().to_path_buf(),
        })
    }

    /// Manual upgrade instruction for an existing install
    pub fn remediation(&self, request: &ModuleRequest) -> String {
        let mut command = format!(
            "update with $ rm -fr {}/{} && ndistrb {} {}",
            MODULES_DIR, request.name, request.user, request.name
        );
        if let Some(version) = request.version.as_deref().filter(|v| *v != DEFAULT_VERSION) {
            command.push(' ');
            command.push_str(version);
        }
        if let Some(alias) = &request.alias_as {
            command.push_str(" --as ");
            command.push_str(alias);
        }
        command
    }
}
