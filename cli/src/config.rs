use anyhow::{Context, Result};
use multicall_call::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings persisted at `~/.multicall/config.json`.
///
/// Missing keys take their defaults, so a file holding only `rpc_endpoint`
/// is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc_endpoint: String,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
    /// Retry, concurrency and worker settings for the call engine
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_endpoint: "http://localhost:8545".to_string(),
            request_timeout_secs: 30, // matches HttpTransportConfig
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Read the config file, falling back to defaults when it does not exist.
    /// A `--rpc` flag or `MULTICALL_RPC` wins over the file's endpoint.
    pub fn load(config_path: Option<&Path>, rpc_override: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(config_path)?;
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Malformed config at {:?}", path))?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => {
                return Err(err).with_context(|| format!("Cannot read config at {:?}", path))
            }
        };

        if let Some(endpoint) = rpc_override {
            config.rpc_endpoint = endpoint.to_string();
        }
        Ok(config)
    }

    /// Write the config as pretty JSON, creating `~/.multicall` on first use
    pub fn save(&self, config_path: Option<&Path>) -> Result<()> {
        let path = Self::resolve_path(config_path)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("Cannot create {:?}", dir))?;
        }

        fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Cannot write config to {:?}", path))
    }

    /// Write a default config, refusing to clobber an existing one unless forced
    pub fn init(config_path: Option<&Path>, force: bool) -> Result<PathBuf> {
        let path = Self::resolve_path(config_path)?;
        if path.exists() && !force {
            anyhow::bail!("Config already exists at {:?}. Use --force to overwrite", path);
        }

        Self::default().save(Some(&path))?;
        Ok(path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Engine settings from the file with `MULTICALL_*` variables applied on top
    pub fn engine_config(&self) -> EngineConfig {
        self.engine.clone().with_env_overrides()
    }

    /// Explicit path, else `~/.multicall/config.json`
    fn resolve_path(config_path: Option<&Path>) -> Result<PathBuf> {
        match config_path {
            Some(path) => Ok(path.to_path_buf()),
            None => dirs::home_dir()
                .map(|home| home.join(".multicall").join("config.json"))
                .context("Unable to determine home directory for the config file"),
        }
    }
}
