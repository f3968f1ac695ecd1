//! Version marker store - the durable record of an installed version.

use std::io::{self, Write};
use std::path::Path;

use crate::{NdistrbError, Result};

/// Reads and writes the single version string kept in a module's marker file
pub struct VersionMarker;

impl VersionMarker {
    /// Read the recorded version. A missing marker is `None`, not an error.
    ///
    /// A single trailing line ending is dropped so markers written by shell
    /// tools (`echo "$version" > file`) compare equal.
    pub fn read(path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let version = contents
                    .strip_suffix("\r\n")
                    .or_else(|| contents.strip_suffix('\n'))
                    .unwrap_or(&contents);
                Ok(Some(version.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Record `version` at `path`.
    ///
    /// The contents go to a temporary file in the same directory which is
    /// then renamed over `path`, so a reader sees either no marker or the
    /// complete one.
    pub fn write(path: &Path, version: &str) -> Result<()> {
        let dir = path.parent().ok_or_else(|| {
            NdistrbError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("marker path {} has no parent directory", path.display()),
            ))
        })?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(version.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| NdistrbError::Io(e.error))?;

        log::debug!("Recorded version {} in {}", version, path.display());
        Ok(())
    }
}
