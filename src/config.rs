//! Configuration for qlacref-postcodes
//!
//! Centralized configuration with sensible defaults.
//!
//! ## Data Directory Precedence
//! 1. Explicit `ConfigBuilder::data_dir`
//! 2. `QLACREF_DATA_DIR` (only when the builder reads the environment)
//! 3. The bundled `data/` directory next to the crate

use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::{PostcodeError, Result};

/// Environment variable overriding the partition directory
pub const DATA_DIR_ENV: &str = "QLACREF_DATA_DIR";

/// Environment variable that switches all partition loading off
pub const DISABLE_LOADING_ENV: &str = "QLACREF_DISABLE_LOADING";

/// Partition directory shipped alongside the crate
pub const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// Main configuration for a store or writer instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the partition files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── postcodes_A.msgpack.br
    ///     ├── postcodes_B.msgpack.br
    ///     └── ...
    pub data_dir: PathBuf,

    /// When set, the store never touches the data directory
    pub loading_disabled: bool,

    // -------------------------------------------------------------------------
    // Compression Configuration
    // -------------------------------------------------------------------------
    /// Brotli quality (0..=11)
    pub compression_quality: u32,

    /// Brotli window size, log2 (10..=24)
    pub compression_window: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(BUNDLED_DATA_DIR),
            loading_disabled: false,
            compression_quality: 11,
            compression_window: 22,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Config driven by the process environment, everything else default
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    data_dir: Option<PathBuf>,
    loading_disabled: Option<bool>,
    read_env: bool,
}

impl ConfigBuilder {
    /// Set the data directory; wins over `QLACREF_DATA_DIR`
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Force loading on or off; wins over `QLACREF_DISABLE_LOADING`
    pub fn loading_disabled(mut self, disabled: bool) -> Self {
        self.loading_disabled = Some(disabled);
        self
    }

    /// Set the brotli quality
    pub fn compression_quality(mut self, quality: u32) -> Self {
        self.config.compression_quality = quality;
        self
    }

    /// Set the brotli window (log2 of the window size)
    pub fn compression_window(mut self, lgwin: u32) -> Self {
        self.config.compression_window = lgwin;
        self
    }

    /// Consult `QLACREF_DATA_DIR` and `QLACREF_DISABLE_LOADING` on build
    pub fn with_env(mut self) -> Self {
        self.read_env = true;
        self
    }

    pub fn build(self) -> Result<Config> {
        let mut config = self.config;

        let (env_dir, env_disabled) = if self.read_env {
            (
                std::env::var_os(DATA_DIR_ENV),
                std::env::var(DISABLE_LOADING_ENV).ok(),
            )
        } else {
            (None, None)
        };

        if let Some(dir) = resolve_data_dir(self.data_dir, env_dir) {
            config.data_dir = dir;
        }

        config.loading_disabled = match (self.loading_disabled, env_disabled) {
            (Some(explicit), _) => explicit,
            (None, Some(value)) => is_truthy(&value),
            (None, None) => false,
        };

        if config.compression_quality > 11 {
            return Err(PostcodeError::Config(format!(
                "compression quality must be 0..=11, got {}",
                config.compression_quality
            )));
        }

        if !(10..=24).contains(&config.compression_window) {
            return Err(PostcodeError::Config(format!(
                "compression window must be 10..=24, got {}",
                config.compression_window
            )));
        }

        Ok(config)
    }
}

/// Pick the data directory: explicit argument, then environment value
///
/// Returns `None` when neither is set (caller keeps the bundled default).
/// An empty environment value counts as unset.
pub fn resolve_data_dir(explicit: Option<PathBuf>, env: Option<OsString>) -> Option<PathBuf> {
    explicit.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
}

/// Interpret an environment flag value
///
/// Empty, `0`, `false`, `no` and `off` are false; anything else is true.
pub fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
