//! Module requests and the on-disk layout derived from them.

use std::path::{Path, PathBuf};

use crate::{NdistrbError, Result};

/// Version token meaning "latest", used when no version is requested.
pub const DEFAULT_VERSION: &str = "master";

/// Directory under the project root that holds installed modules.
pub const MODULES_DIR: &str = "modules";

/// Executables directory, both inside a module and under the project root.
pub const BIN_DIR: &str = "bin";

/// Library directory, both inside a module and under the project root.
pub const LIB_DIR: &str = "lib";

/// Name of the marker file recording the installed version.
pub const MARKER_FILE: &str = ".version_marker";

/// A request to install `name` from `user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    pub user: String,
    pub name: String,
    pub version: Option<String>,
    pub alias_as: Option<String>,
}

impl ModuleRequest {
    /// Create a request, rejecting names that are unsafe to interpolate into
    /// a URL or a path.
    pub fn new(
        user: impl Into<String>,
        name: impl Into<String>,
        version: Option<String>,
        alias_as: Option<String>,
    ) -> Result<Self> {
        let request = Self {
            user: user.into(),
            name: name.into(),
            version,
            alias_as,
        };

        validate_name("user", &request.user)?;
        validate_name("module", &request.name)?;
        if let Some(alias) = &request.alias_as {
            validate_name("alias", alias)?;
        }
        if let Some(version) = &request.version {
            validate_version(version)?;
        }

        Ok(request)
    }

    /// The version to fetch and record, `master` when none was given.
    pub fn requested_version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Name the library is aliased under.
    pub fn link_name(&self) -> &str {
        self.alias_as.as_deref().unwrap_or(&self.name)
    }
}

/// Reject names that could escape a URL segment or a path component.
pub fn validate_name(kind: &'static str, value: &str) -> Result<()> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());

    if invalid {
        return Err(NdistrbError::InvalidName {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn validate_version(value: &str) -> Result<()> {
    let invalid = value.is_empty()
        || value
            .chars()
            .any(|c| c == '/' || c.is_whitespace() || c.is_control());

    if invalid {
        return Err(NdistrbError::InvalidName {
            kind: "version",
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Paths of a single module below a project root.
#[derive(Debug, Clone)]
pub struct ModulePaths {
    destination: PathBuf,
}

impl ModulePaths {
    pub fn new(root: &Path, name: &str) -> Self {
        Self {
            destination: root.join(MODULES_DIR).join(name),
        }
    }

    /// `<root>/modules/<name>`
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// `<root>/modules/<name>/.version_marker`
    pub fn marker(&self) -> PathBuf {
        self.destination.join(MARKER_FILE)
    }
}
