//! Tarball extraction with wrapper-directory stripping.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::EntryType;

use crate::{NdistrbError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const STAGING_PREFIX: &str = ".ndistrb-";

/// Archive extractor
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Extract a gzipped tarball into `dest_dir`, dropping the top-level
    /// wrapper directory of every entry.
    ///
    /// Entries are first unpacked into a staging directory next to
    /// `dest_dir`, which is renamed into place only once every entry has been
    /// written. On failure nothing is left behind at `dest_dir` and the
    /// staging directory is removed.
    pub fn extract(bytes: &[u8], dest_dir: &Path) -> Result<()> {
        if !bytes.starts_with(&GZIP_MAGIC) {
            return Err(NdistrbError::Extraction {
                reason: "not a gzip-compressed archive".to_string(),
            });
        }

        if dest_dir.exists() {
            return Err(NdistrbError::Extraction {
                reason: format!("{} already exists", dest_dir.display()),
            });
        }

        let parent = dest_dir.parent().ok_or_else(|| NdistrbError::Extraction {
            reason: format!("{} has no parent directory", dest_dir.display()),
        })?;
        fs::create_dir_all(parent)?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)?;
        log::debug!("Staging extraction in {}", staging.path().display());

        let decoder = GzDecoder::new(bytes);
        let written = Self::extract_tar_with_strip(decoder, staging.path(), 1)?;
        if written == 0 {
            return Err(NdistrbError::Extraction {
                reason: "archive contains no files".to_string(),
            });
        }

        fs::rename(staging.path(), dest_dir).map_err(|e| NdistrbError::Extraction {
            reason: format!("Failed to move staging directory to {}: {}", dest_dir.display(), e),
        })?;

        log::debug!("Extracted {} entries into {}", written, dest_dir.display());
        Ok(())
    }

    /// Extract tar with prefix stripping, returning the number of entries
    /// written. The reader is drained to the end so a corrupt trailer is
    /// reported as an error.
    pub fn extract_tar_with_strip<R: Read>(reader: R, dest_dir: &Path, strip_components: usize) -> Result<usize> {
        let mut archive = tar::Archive::new(reader);
        let mut written = 0;

        let dest_dir_canonical = dest_dir.canonicalize().map_err(|e| NdistrbError::Extraction {
            reason: format!("Failed to canonicalize {}: {}", dest_dir.display(), e),
        })?;

        for entry in archive.entries().map_err(extraction_error("Failed to read tar"))? {
            let mut entry = entry.map_err(extraction_error("Failed to read tar entry"))?;

            let entry_type = entry.header().entry_type();
            if matches!(entry_type, EntryType::XGlobalHeader | EntryType::XHeader) {
                continue;
            }

            let path = entry.path().map_err(extraction_error("Invalid path in tar"))?;
            let Some(stripped) = strip_path(&path, strip_components)? else {
                continue;
            };

            // An earlier symlink entry must not redirect this one
            reject_symlinked_components(dest_dir, &stripped)?;

            let outpath = dest_dir.join(&stripped);

            if entry_type.is_dir() {
                fs::create_dir_all(&outpath)?;
            } else if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            ensure_within(&outpath, &dest_dir_canonical, &stripped)?;

            if !entry_type.is_dir() {
                entry
                    .unpack(&outpath)
                    .map_err(extraction_error("Failed to extract"))?;
            }

            log::trace!("Extracted {}", stripped.display());
            written += 1;
        }

        let mut rest = archive.into_inner();
        io::copy(&mut rest, &mut io::sink()).map_err(extraction_error("Corrupt archive trailer"))?;

        Ok(written)
    }
}

/// Drop `strip_components` leading components. Returns `None` for entries
/// that are nothing but the stripped prefix.
fn strip_path(path: &Path, strip_components: usize) -> Result<Option<PathBuf>> {
    let components: Vec<_> = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if components.len() <= strip_components {
        return Ok(None);
    }

    let stripped: PathBuf = components[strip_components..].iter().collect();

    let escapes = components
        .iter()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return Err(NdistrbError::PathTraversal {
            path: path.display().to_string(),
        });
    }

    Ok(Some(stripped))
}

/// Fail if any already-extracted component of `relative` below `dest_dir`
/// is a symlink.
fn reject_symlinked_components(dest_dir: &Path, relative: &Path) -> Result<()> {
    let mut current = dest_dir.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                return Err(NdistrbError::PathTraversal {
                    path: relative.display().to_string(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Check that `outpath`, resolved through its parent, stays below the
/// canonical destination.
fn ensure_within(outpath: &Path, dest_dir_canonical: &Path, relative: &Path) -> Result<()> {
    let resolved = match (outpath.parent(), outpath.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize()?.join(name),
        _ => outpath.canonicalize()?,
    };

    if !resolved.starts_with(dest_dir_canonical) {
        return Err(NdistrbError::PathTraversal {
            path: relative.display().to_string(),
        });
    }
    Ok(())
}

fn extraction_error(context: &'static str) -> impl Fn(io::Error) -> NdistrbError {
    move |e| NdistrbError::Extraction {
        reason: format!("{}: {}", context, e),
    }
}
