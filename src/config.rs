//! Configuration management
//!
//! The ACL needs only the directory holding the allow-list files and the
//! refresh interval. Both can come from a TOML file, from `.env`/environment
//! variables, or from a node data directory (`<datadir>/acl`).

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Subdirectory of a node data directory holding the allow-lists
pub const DATADIR_ACL: &str = "acl";

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclConfig {
    /// Directory containing allowed_from.txt, allowed_to.txt, allowed_smart_deploy.txt
    pub acl_dir: PathBuf,
    pub refresh_interval_ms: u64,
}

/// TOML file layout:
///
/// ```toml
/// [acl]
/// dir = "/var/lib/node/acl"
/// refresh_interval_ms = 1000
/// ```
#[derive(Debug, Clone, Deserialize)]
struct TomlConfig {
    acl: AclSection,
}

#[derive(Debug, Clone, Deserialize)]
struct AclSection {
    dir: PathBuf,
    #[serde(default = "default_refresh_interval")]
    refresh_interval_ms: u64,
}

fn default_refresh_interval() -> u64 { DEFAULT_REFRESH_INTERVAL_MS }

impl AclConfig {
    pub fn new<P: AsRef<Path>>(acl_dir: P) -> Self {
        Self {
            acl_dir: acl_dir.as_ref().to_path_buf(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }

    /// Allow-lists live in `<datadir>/acl`
    pub fn from_datadir<P: AsRef<Path>>(datadir: P) -> Self {
        Self::new(datadir.as_ref().join(DATADIR_ACL))
    }

    pub fn with_refresh_interval_ms(mut self, ms: u64) -> Self {
        self.refresh_interval_ms = ms;
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Load from a TOML file with an `[acl]` table
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid ACL config: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: TomlConfig = toml::from_str(content)
            .context("Failed to parse TOML configuration")?;

        let config = Self::new(raw.acl.dir).with_refresh_interval_ms(raw.acl.refresh_interval_ms);
        config.validate()?;
        Ok(config)
    }

    /// Load from `.env` / environment: ACL_DIR (required), ACL_REFRESH_INTERVAL_MS
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let dir = std::env::var("ACL_DIR").context("ACL_DIR not set")?;
        let mut config = Self::new(dir);

        if let Ok(ms) = std::env::var("ACL_REFRESH_INTERVAL_MS") {
            config.refresh_interval_ms = ms
                .parse()
                .with_context(|| format!("Invalid ACL_REFRESH_INTERVAL_MS: {}", ms))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms == 0 {
            bail!("refresh_interval_ms must be greater than 0");
        }
        Ok(())
    }
}
