use anyhow::{bail, Context, Result};
use std::process::Command;

use ndistrb_pm::Config;

/// Open the project's `.ndistro` file in the configured editor and wait for it.
pub fn execute(config: &Config) -> Result<u8> {
    let path = config.distro_file();

    // The editor may carry its own arguments, e.g. `code --wait`.
    let mut parts = config.editor.split_whitespace();
    let program = parts.next().context("No editor configured")?;

    log::info!("Opening {} with {}", path.display(), config.editor);

    let status = Command::new(program)
        .args(parts)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor `{}`", config.editor))?;

    if !status.success() {
        bail!("Editor `{}` exited with {}", config.editor, status);
    }

    Ok(0)
}
