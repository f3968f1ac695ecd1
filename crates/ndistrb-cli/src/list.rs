use anyhow::{Context, Result};
use std::sync::Arc;

use ndistrb_pm::http::HttpClient;
use ndistrb_pm::package::validate_name;
use ndistrb_pm::{Config, ModuleListing, Output, Reporter};

pub async fn execute(user: &str, config: Arc<Config>, output: &Output) -> Result<u8> {
    validate_name("user", user)?;

    let client = Arc::new(
        HttpClient::with_config(config.http_config()).context("Failed to create HTTP client")?,
    );
    let listing = ModuleListing::new(client, config);

    output.report(&format!("fetching {} modules", user));
    let modules = listing
        .fetch(user)
        .await
        .with_context(|| format!("Failed to list modules of {}", user))?;

    if modules.is_empty() {
        output.report(&format!("{} has no modules listed", user));
    }
    for module in &modules {
        output.list_item(module);
    }

    Ok(0)
}
