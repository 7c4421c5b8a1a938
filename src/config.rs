//! Client configuration
//!
//! Values are resolved in three layers, lowest priority first:
//! 1. Built-in defaults (local server on port 5000, 500 ms auto-advance)
//! 2. Optional TOML file (`<config_dir>/image-labeler/config.toml` or `--config`)
//! 3. Environment variables and command line flags

use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::{AppError, Result};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_ADVANCE_DELAY_MS: u64 = 500;

/// Command line flags
#[derive(Parser, Debug, Default)]
#[command(name = "image-labeler", version, about = "Label images Good/Bad against a labeling server")]
pub struct Cli {
    /// Base URL of the labeling server
    #[arg(long, env = "LABELER_SERVER")]
    pub server: Option<String>,

    /// Path to a TOML config file
    #[arg(long, env = "LABELER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Delay before jumping to the next image after marking
    #[arg(long, env = "LABELER_ADVANCE_DELAY_MS")]
    pub advance_delay_ms: Option<u64>,

    /// Folder to load on startup (overrides the remembered one)
    #[arg(long)]
    pub folder: Option<String>,
}

/// Server routes for each API operation
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Routes {
    pub images: String,
    pub image: String,
    pub save: String,
    pub deduplicate: String,
    pub status: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            images: "/api/images".into(),
            image: "/api/image/".into(),
            save: "/api/save".into(),
            deduplicate: "/api/deduplicate".into(),
            status: "/api/status".into(),
        }
    }
}

/// On-disk config file. Every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct FileConfig {
    pub server_url: Option<String>,
    pub advance_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub routes: Routes,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read the file if it exists. An explicitly given path must exist.
    fn load(explicit: Option<&PathBuf>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.clone(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        info!("Reading config from {}", path.display());
        let text = std::fs::read_to_string(&path)?;
        Self::parse(&text)
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: Url,
    pub routes: Routes,
    pub advance_delay: Duration,
    pub request_timeout: Option<Duration>,
    pub startup_folder: Option<String>,
}

impl Config {
    /// Resolve flags, env and the config file into a `Config`
    pub fn load(cli: Cli) -> Result<Self> {
        let file = FileConfig::load(cli.config.as_ref())?;
        Self::resolve(cli, file)
    }

    /// Merge layers; CLI/env beat the file, the file beats defaults
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let server = cli
            .server
            .or(file.server_url)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let server_url = Url::parse(&server).map_err(|e| AppError::Url(format!("{}: {}", server, e)))?;
        if server_url.cannot_be_a_base() {
            return Err(AppError::Url(format!("{}: not a base URL", server)));
        }

        let delay_ms = cli
            .advance_delay_ms
            .or(file.advance_delay_ms)
            .unwrap_or(DEFAULT_ADVANCE_DELAY_MS);

        Ok(Self {
            server_url,
            routes: file.routes,
            advance_delay: Duration::from_millis(delay_ms),
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            startup_folder: cli.folder,
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("image-labeler").join("config.toml"))
}
