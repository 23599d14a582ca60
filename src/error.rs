use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read capture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("request to assistant failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("assistant returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("assistant returned no text")]
    EmptyResponse,
    #[error("assistant output does not match the summary schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("summary is inconsistent: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No packets to export.")]
    NothingToExport,
    #[error("cannot write export {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
