use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub spectrogram: SpectrogramConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_recv_buffer")]
    pub recv_buffer: usize,
}

#[derive(Debug, Deserialize)]
pub struct SpectrogramConfig {
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_scale")]
    pub scale: u32,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            timeout_ms: default_timeout_ms(),
            recv_buffer: default_recv_buffer(),
        }
    }
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            rows: default_rows(),
            period_ms: default_period_ms(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            output_dir: default_output_dir(),
            scale: default_scale(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_ms(),
        }
    }
}

fn default_listen() -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], 5005)) }
fn default_timeout_ms() -> u64 { 500 }
fn default_recv_buffer() -> usize { 8192 }
fn default_block_size() -> usize { 64 }
fn default_rows() -> usize { 128 }
fn default_period_ms() -> u64 { 100 }
fn default_interval() -> u64 { 100 }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }
fn default_scale() -> u32 { 4 }
fn default_refresh_ms() -> u64 { 250 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Look for `specstream.toml` in the working directory, then in the
/// platform config directory.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("specstream.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("specstream").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("specstream").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Apply file values to every CLI option still sitting at its default.
pub fn merge(cli: &mut Cli, cfg: Config) {
    if cli.listen == default_listen() { cli.listen = cfg.network.listen; }
    if cli.timeout_ms == default_timeout_ms() { cli.timeout_ms = cfg.network.timeout_ms; }
    if cli.recv_buffer == default_recv_buffer() { cli.recv_buffer = cfg.network.recv_buffer; }
    if cli.block_size == default_block_size() { cli.block_size = cfg.spectrogram.block_size; }
    if cli.rows == default_rows() { cli.rows = cfg.spectrogram.rows; }
    if cli.period_ms == default_period_ms() { cli.period_ms = cfg.spectrogram.period_ms; }
    if cli.snapshot_interval == default_interval() { cli.snapshot_interval = cfg.snapshot.interval; }
    if cli.output_dir == default_output_dir() { cli.output_dir = cfg.snapshot.output_dir; }
    if cli.scale == default_scale() { cli.scale = cfg.snapshot.scale; }
    if cli.refresh_ms == default_refresh_ms() { cli.refresh_ms = cfg.render.refresh_ms; }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("block size {0} must be even and at least 2")]
    BlockSize(usize),
    #[error("spectrogram must have at least one row")]
    NoRows,
    #[error("snapshot interval must be at least 1")]
    ZeroInterval,
    #[error("image scale must be at least 1")]
    ZeroScale,
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Validated runtime parameters.
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen: SocketAddr,
    pub block_size: usize,
    pub rows: usize,
    pub recv_timeout: Duration,
    pub period: Duration,
    pub snapshot_interval: u64,
    pub output_dir: PathBuf,
    pub recv_buffer: usize,
    pub scale: u32,
    pub refresh: Duration,
    pub max_cycles: Option<u64>,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.block_size < 2 || cli.block_size % 2 != 0 {
            return Err(ConfigError::BlockSize(cli.block_size));
        }
        if cli.rows == 0 {
            return Err(ConfigError::NoRows);
        }
        if cli.snapshot_interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if cli.scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        if cli.timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("receive timeout"));
        }
        if cli.period_ms == 0 {
            return Err(ConfigError::ZeroDuration("loop period"));
        }
        if cli.refresh_ms == 0 {
            return Err(ConfigError::ZeroDuration("refresh period"));
        }

        Ok(Self {
            listen: cli.listen,
            block_size: cli.block_size,
            rows: cli.rows,
            recv_timeout: Duration::from_millis(cli.timeout_ms),
            period: Duration::from_millis(cli.period_ms),
            snapshot_interval: cli.snapshot_interval,
            output_dir: cli.output_dir.clone(),
            recv_buffer: cli.recv_buffer,
            scale: cli.scale,
            refresh: Duration::from_millis(cli.refresh_ms),
            max_cycles: cli.cycles,
        })
    }

    /// Width of one spectrum row.
    pub fn bins(&self) -> usize {
        self.block_size / 2 + 1
    }
}
