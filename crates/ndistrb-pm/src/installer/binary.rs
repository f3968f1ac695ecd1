//! Binary linker - exposes a module's executables in `<root>/bin`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::package::BIN_DIR;
use crate::Result;

use super::hooks::{BuildStep, HookContext};

/// Links every file in `<module>/bin/` into `<root>/bin/`
pub struct BinaryLinker;

impl BinaryLinker {
    /// Link the module's binaries, returning the created links
    pub async fn link(&self, ctx: &HookContext) -> Result<Vec<PathBuf>> {
        let source_dir = ctx.destination.join(BIN_DIR);
        if !tokio::fs::try_exists(&source_dir).await? {
            log::debug!("{} has no bin directory", ctx.module);
            return Ok(Vec::new());
        }

        let bin_dir = ctx.root.join(BIN_DIR);
        tokio::fs::create_dir_all(&bin_dir).await?;

        let mut installed = Vec::new();
        let mut entries = tokio::fs::read_dir(&source_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let source = entry.path();
            let link_path = bin_dir.join(entry.file_name());
            self.create_bin_link(&source, &link_path).await?;
            log::debug!("Linked {} -> {}", link_path.display(), source.display());
            installed.push(link_path);
        }

        installed.sort();
        Ok(installed)
    }

    /// Create a binary link (symlink on Unix)
    #[cfg(unix)]
    async fn create_bin_link(&self, source: &Path, link: &Path) -> Result<()> {
        if tokio::fs::symlink_metadata(link).await.is_ok() {
            tokio::fs::remove_file(link).await?;
        }

        tokio::fs::symlink(source, link).await?;

        use std::os::unix::fs::PermissionsExt;
        let metadata = tokio::fs::metadata(source).await?;
        let mut perms = metadata.permissions();
        perms.set_mode(perms.mode() | 0o111);
        tokio::fs::set_permissions(source, perms).await?;

        Ok(())
    }

    /// Create a binary link (file symlink on Windows)
    #[cfg(windows)]
    async fn create_bin_link(&self, source: &Path, link: &Path) -> Result<()> {
        if tokio::fs::symlink_metadata(link).await.is_ok() {
            tokio::fs::remove_file(link).await?;
        }

        tokio::fs::symlink_file(source, link).await?;
        Ok(())
    }
}

#[async_trait]
impl BuildStep for BinaryLinker {
    fn name(&self) -> &'static str {
        "bin"
    }

    async fn run(&self, ctx: &HookContext) -> Result<()> {
        self.link(ctx).await.map(|_| ())
    }
}
