use crate::error::ConfigError;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Command-line arguments. Anything given here wins over the config file.
#[derive(Parser, Debug, Clone)]
#[command(name = "intellipcap")]
#[command(version)]
#[command(about = "Browse a packet capture and ask an AI assistant about it")]
pub struct Args {
    /// Capture file to open on start
    pub capture: Option<PathBuf>,

    /// Open the built-in sample capture on start
    #[arg(long, conflicts_with = "capture")]
    pub sample: bool,

    /// TOML configuration file
    #[arg(short, long, env = "INTELLIPCAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use the local mock assistant instead of the remote model
    #[arg(long)]
    pub mock: bool,

    /// Seed for the sample data and fabricated protocol fields
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where to write the log
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Gemini,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub backend: Backend,
    pub model: String,
    pub endpoint: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: Option<u64>,
    /// Packets included in an analysis prompt.
    pub analysis_sample: usize,
    /// Filtered packets included in a chat prompt.
    pub chat_sample: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Gemini,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "API_KEY".to_string(),
            timeout_secs: None,
            analysis_sample: 50,
            chat_sample: 25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { directory: PathBuf::from(".") }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("intellipcap.log"),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assistant: AssistantConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
    pub sample: SampleConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// File config (or defaults) with command-line overrides applied.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if args.mock {
            config.assistant.backend = Backend::Mock;
        }
        if args.seed.is_some() {
            config.sample.seed = args.seed;
        }
        if let Some(file) = &args.log_file {
            config.logging.file = file.clone();
        }
        Ok(config)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.logging.level).unwrap_or(log::LevelFilter::Info)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.assistant.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "assistant.model",
                reason: "must not be empty".to_string(),
            });
        }
        if self.assistant.analysis_sample == 0 {
            return Err(ConfigError::Invalid {
                field: "assistant.analysis_sample",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.assistant.chat_sample == 0 {
            return Err(ConfigError::Invalid {
                field: "assistant.chat_sample",
                reason: "must be at least 1".to_string(),
            });
        }
        if log::LevelFilter::from_str(&self.logging.level).is_err() {
            return Err(ConfigError::Invalid {
                field: "logging.level",
                reason: format!("unknown level '{}'", self.logging.level),
            });
        }
        Ok(())
    }
}
