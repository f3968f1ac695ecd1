use thiserror::Error;

#[derive(Error, Debug)]
pub enum NdistrbError {
    // Input errors
    #[error("Invalid {kind} name: {value:?}")]
    InvalidName { kind: &'static str, value: String },

    // Network errors
    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    // Extraction errors
    #[error("Extraction failed: {reason}")]
    Extraction { reason: String },

    #[error("Path traversal detected in archive: {path}")]
    PathTraversal { path: String },

    // Build hook errors
    #[error("Build step '{step}' failed for {module}: {reason}")]
    HookFailed {
        step: &'static str,
        module: String,
        reason: String,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse ndistrb.toml: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, NdistrbError>;
