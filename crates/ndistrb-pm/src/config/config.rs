use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::http::HttpClientConfig;
use super::source::{ConfigLoader, ConfigSource, RawConfig, PROJECT_CONFIG_FILE};

const DEFAULT_HOST: &str = "github.com";
const DEFAULT_LISTING_URL: &str = "https://{host}/api/v2/yaml/blob/all/{user}/.ndistro/master";
const DEFAULT_TIMEOUT: u64 = 300;
const DEFAULT_CONNECT_TIMEOUT: u64 = 10;
const DEFAULT_EDITOR: &str = "vi";

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root every other path is anchored to
    root: PathBuf,

    /// Host serving archives and listings
    pub host: String,

    /// Listing URL template with `{host}` and `{user}` placeholders
    pub listing_url: String,

    /// Where `ndistrb update` downloads the new binary from
    pub update_url: Option<String>,

    /// Whole-request timeout in seconds
    pub timeout: u64,

    /// Connect timeout in seconds
    pub connect_timeout: u64,

    /// HTTP(S) proxy URL
    pub proxy: Option<String>,

    /// Editor used by `ndistrb edit`
    pub editor: String,

    sources: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_root(".")
    }
}

impl Config {
    /// Defaults anchored at `root`
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            host: DEFAULT_HOST.to_string(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            update_url: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            proxy: None,
            editor: DEFAULT_EDITOR.to_string(),
            sources: HashMap::new(),
        }
    }

    /// Build configuration from all sources (defaults, project file, env)
    pub fn build<P: AsRef<Path>>(root: P, use_environment: bool) -> Result<Self> {
        let loader = ConfigLoader::new(use_environment);
        let mut config = Self::with_root(root);

        for key in Self::config_keys() {
            config.sources.insert(key.to_string(), ConfigSource::Default);
        }

        // 1. Project file
        let project_config = loader.load_config_file(config.root.join(PROJECT_CONFIG_FILE))?;
        config.merge_raw_config(project_config, ConfigSource::Project);

        // 2. Environment overrides
        if use_environment {
            config.apply_env_overrides(&loader)?;
        }

        log::debug!("Configuration for {}: {:?}", config.root.display(), config);

        Ok(config)
    }

    fn config_keys() -> [&'static str; 7] {
        [
            "host",
            "listing-url",
            "update-url",
            "timeout",
            "connect-timeout",
            "proxy",
            "editor",
        ]
    }

    fn merge_raw_config(&mut self, raw: RawConfig, source: ConfigSource) {
        if let Some(host) = raw.host {
            self.host = host;
            self.sources.insert("host".to_string(), source.clone());
        }
        if let Some(listing_url) = raw.listing_url {
            self.listing_url = listing_url;
            self.sources.insert("listing-url".to_string(), source.clone());
        }
        if let Some(update_url) = raw.update_url {
            self.update_url = Some(update_url);
            self.sources.insert("update-url".to_string(), source.clone());
        }
        if let Some(timeout) = raw.timeout {
            self.timeout = timeout;
            self.sources.insert("timeout".to_string(), source.clone());
        }
        if let Some(connect_timeout) = raw.connect_timeout {
            self.connect_timeout = connect_timeout;
            self.sources.insert("connect-timeout".to_string(), source.clone());
        }
        if let Some(proxy) = raw.proxy {
            self.proxy = Some(proxy);
            self.sources.insert("proxy".to_string(), source.clone());
        }
        if let Some(editor) = raw.editor {
            self.editor = editor;
            self.sources.insert("editor".to_string(), source);
        }
    }

    fn apply_env_overrides(&mut self, loader: &ConfigLoader) -> Result<()> {
        // EDITOR sits below NDISTRB_EDITOR and the project file
        if self.get_source("editor") == Some(&ConfigSource::Default) {
            if let Some(editor) = loader.get_env("EDITOR") {
                self.editor = editor;
                self.sources.insert("editor".to_string(), ConfigSource::Environment("EDITOR".to_string()));
            }
        }

        let string_keys = ["host", "listing-url", "update-url", "proxy", "editor"];
        for key in string_keys {
            let Some(value) = loader.get_env_config(key) else {
                continue;
            };
            match key {
                "host" => self.host = value,
                "listing-url" => self.listing_url = value,
                "update-url" => self.update_url = Some(value),
                "proxy" => self.proxy = Some(value),
                _ => self.editor = value,
            }
            self.sources.insert(key.to_string(), env_source(key));
        }

        if let Some(timeout) = loader.get_env_u64("timeout")? {
            self.timeout = timeout;
            self.sources.insert("timeout".to_string(), env_source("timeout"));
        }
        if let Some(connect_timeout) = loader.get_env_u64("connect-timeout")? {
            self.connect_timeout = connect_timeout;
            self.sources.insert("connect-timeout".to_string(), env_source("connect-timeout"));
        }

        Ok(())
    }

    /// Get the source of a configuration value
    pub fn get_source(&self, key: &str) -> Option<&ConfigSource> {
        self.sources.get(key)
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/.ndistro`, the file opened by `ndistrb edit`
    pub fn distro_file(&self) -> PathBuf {
        self.root.join(".ndistro")
    }

    /// Listing URL for `user`
    pub fn listing_url_for(&self, user: &str) -> String {
        self.listing_url
            .replace("{host}", &self.host)
            .replace("{user}", user)
    }

    /// HTTP client settings derived from this configuration
    pub fn http_config(&self) -> HttpClientConfig {
        let mut http = HttpClientConfig::new()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_connect_timeout(Duration::from_secs(self.connect_timeout));
        if let Some(proxy) = &self.proxy {
            http = http.with_proxy(proxy.clone());
        }
        http
    }
}

fn env_source(key: &str) -> ConfigSource {
    ConfigSource::Environment(format!("NDISTRB_{}", key.to_uppercase().replace('-', "_")))
}
