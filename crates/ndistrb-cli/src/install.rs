use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use ndistrb_pm::http::HttpClient;
use ndistrb_pm::{Config, HookRunner, HttpFetcher, InstallOutcome, ModuleInstaller, ModuleRequest, Output};

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Account the module is published under
    #[arg(value_name = "USER", requires = "module")]
    pub user: Option<String>,

    /// Module to install
    #[arg(value_name = "MODULE")]
    pub module: Option<String>,

    /// Tag, branch or commit to install (defaults to master)
    #[arg(id = "module_version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Link the module's library under a different name
    #[arg(long = "as", value_name = "ALIAS")]
    pub alias_as: Option<String>,
}

pub async fn execute(args: InstallArgs, config: Arc<Config>, output: Arc<Output>) -> Result<u8> {
    let (Some(user), Some(module)) = (args.user, args.module) else {
        anyhow::bail!("Both <user> and <module> are required");
    };

    let request = ModuleRequest::new(user, module, args.version, args.alias_as)?;

    let client = Arc::new(
        HttpClient::with_config(config.http_config()).context("Failed to create HTTP client")?,
    );

    let installer = ModuleInstaller::new(
        config.root(),
        config.host.clone(),
        Arc::new(HttpFetcher::new(client)),
        Arc::new(HookRunner::new()),
        output,
    );

    let outcome = installer
        .install(&request)
        .await
        .with_context(|| format!("Failed to install {}/{}", request.user, request.name))?;

    if let InstallOutcome::Installed { path, .. } = &outcome {
        log::debug!("Installed into {}", path.display());
    }

    Ok(0)
}
