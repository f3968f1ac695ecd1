use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;

use ndistrb_pm::http::HttpClient;
use ndistrb_pm::{Config, Output, Reporter};

/// Replace the running executable with the build published at `update-url`.
pub async fn execute(config: &Config, output: &Output) -> Result<u8> {
    let url = config
        .update_url
        .as_deref()
        .context("No update URL configured; set `update-url` in ndistrb.toml or NDISTRB_UPDATE_URL")?;

    let client = HttpClient::with_config(config.http_config()).context("Failed to create HTTP client")?;

    output.report(&format!("fetching {}", url));
    let bytes = client
        .download_bytes(url)
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    replace_executable(&exe, &bytes)?;

    output.report(&format!("updated {}", exe.display()));
    Ok(0)
}

/// Atomically swap `exe` for `bytes`. The new file is written next to the
/// old one so the final rename stays on one filesystem.
fn replace_executable(exe: &Path, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        bail!("Downloaded executable is empty");
    }

    let dir = exe
        .parent()
        .with_context(|| format!("{} has no parent directory", exe.display()))?;

    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o755))?;
    }

    file.persist(exe)
        .with_context(|| format!("Failed to replace {}", exe.display()))?;
    Ok(())
}
