//! Console configuration.
//!
//! All knobs deserialize from a TOML file with full defaults, so an empty or
//! absent file yields a working local-dev setup. The signing key is never
//! part of this file; it comes from the environment only.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for the console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Wallet and RPC endpoint settings.
    pub wallet: WalletConfig,

    /// Contract interface resolution settings.
    pub abi: AbiConfig,

    /// Provider discovery settings.
    pub discovery: DiscoveryConfig,

    /// Contract binding settings.
    pub contract: ContractConfig,
}

/// Wallet and RPC endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint the wallet talks to.
    pub rpc_url: String,

    /// Per-request RPC timeout in seconds. Confirmation waits are exempt.
    pub rpc_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            rpc_timeout_secs: 10,
        }
    }
}

impl WalletConfig {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn parsed_rpc_url(&self) -> Result<Url, url::ParseError> {
        self.rpc_url.parse()
    }
}

/// Contract interface resolution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AbiConfig {
    /// Candidate artifact locations, tried strictly in order.
    pub candidates: Vec<String>,

    /// When set, candidates are fetched over HTTP relative to this URL.
    pub base_url: Option<String>,

    /// Directory candidates resolve against when reading from disk.
    pub artifact_root: String,
}

impl Default for AbiConfig {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
            base_url: None,
            artifact_root: ".".to_string(),
        }
    }
}

fn default_candidates() -> Vec<String> {
    vec![
        "../build/contracts/UserProfile.json".to_string(),
        "./build/contracts/UserProfile.json".to_string(),
        "/build/contracts/UserProfile.json".to_string(),
    ]
}

/// Provider discovery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// How long startup waits for a provider to appear, in milliseconds.
    pub window_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { window_ms: 1200 }
    }
}

impl DiscoveryConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

/// Contract binding settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// Address `load` binds when the operator does not name one.
    pub address: Option<String>,
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConsoleConfig {
    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: ConsoleConfig = toml::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml(&raw)
    }

    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.wallet.parsed_rpc_url().is_err() {
            errors.push(format!("wallet.rpc_url is not a valid URL: {}", self.wallet.rpc_url));
        }
        if self.wallet.rpc_timeout_secs == 0 {
            errors.push("wallet.rpc_timeout_secs must be positive".to_string());
        }
        if self.abi.candidates.is_empty() {
            errors.push("abi.candidates must not be empty".to_string());
        }
        if let Some(base) = &self.abi.base_url {
            if base.parse::<Url>().is_err() {
                errors.push(format!("abi.base_url is not a valid URL: {}", base));
            }
        }
        if self.discovery.window_ms == 0 {
            errors.push("discovery.window_ms must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
