//! Library linker - aliases a module under `<root>/lib`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::package::LIB_DIR;
use crate::{NdistrbError, Result};

use super::hooks::{BuildStep, HookContext};

/// Links `<root>/lib/<alias>` to the module's library entry point
pub struct LibraryLinker;

impl LibraryLinker {
    /// Resolve what the alias should point at: `lib/<module>` inside the
    /// module when present, else its `lib/` directory, else the module root.
    pub fn link_target(ctx: &HookContext) -> PathBuf {
        let named = ctx.destination.join(LIB_DIR).join(&ctx.module);
        if named.exists() {
            return named;
        }

        let lib_dir = ctx.destination.join(LIB_DIR);
        if lib_dir.is_dir() {
            return lib_dir;
        }

        ctx.destination.clone()
    }

    /// Create the alias link, returning its path
    pub async fn link(&self, ctx: &HookContext) -> Result<PathBuf> {
        let lib_dir = ctx.root.join(LIB_DIR);
        tokio::fs::create_dir_all(&lib_dir).await?;

        let target = Self::link_target(ctx);
        let link = lib_dir.join(&ctx.link_name);

        if let Ok(metadata) = tokio::fs::symlink_metadata(&link).await {
            if !metadata.file_type().is_symlink() {
                return Err(NdistrbError::HookFailed {
                    step: "lib",
                    module: ctx.module.clone(),
                    reason: format!("{} exists and is not a link", link.display()),
                });
            }
            tokio::fs::remove_file(&link).await?;
        }

        create_link(&target, &link).await?;
        log::debug!("Aliased {} -> {}", link.display(), target.display());
        Ok(link)
    }
}

#[cfg(unix)]
async fn create_link(target: &Path, link: &Path) -> Result<()> {
    tokio::fs::symlink(target, link).await?;
    Ok(())
}

#[cfg(windows)]
async fn create_link(target: &Path, link: &Path) -> Result<()> {
    if target.is_dir() {
        tokio::fs::symlink_dir(target, link).await?;
    } else {
        tokio::fs::symlink_file(target, link).await?;
    }
    Ok(())
}

#[async_trait]
impl BuildStep for LibraryLinker {
    fn name(&self) -> &'static str {
        "lib"
    }

    async fn run(&self, ctx: &HookContext) -> Result<()> {
        self.link(ctx).await.map(|_| ())
    }
}
