//! Configuration and access token storage for funcscan
//!
//! Stores configuration in ~/.funcscan/config.yaml and the ARM access token
//! in ~/.funcscan/credentials

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::azure::{ClientSettings, DEFAULT_MANAGEMENT_ENDPOINT};
use crate::fetch::Strategy;

const CONFIG_DIR: &str = ".funcscan";
const CONFIG_FILE: &str = "config.yaml";
const CREDENTIALS_FILE: &str = "credentials";
const TOKEN_KEY: &str = "AZURE_ACCESS_TOKEN";

/// funcscan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncscanConfig {
    /// ARM endpoint (default: https://management.azure.com)
    #[serde(default = "default_management_endpoint")]
    pub management_endpoint: String,

    /// Discovery strategy used when `--strategy` is not given
    #[serde(default)]
    pub default_strategy: Strategy,

    /// Concurrent subscription workers (0 = number of CPUs)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Subscriptions scanned when none are passed on the command line
    #[serde(default)]
    pub subscriptions: Vec<String>,
}

impl Default for FuncscanConfig {
    fn default() -> Self {
        Self {
            management_endpoint: default_management_endpoint(),
            default_strategy: Strategy::default(),
            max_workers: default_max_workers(),
            request_timeout_secs: default_request_timeout_secs(),
            subscriptions: Vec::new(),
        }
    }
}

impl FuncscanConfig {
    pub fn client_settings(&self, access_token: String) -> ClientSettings {
        ClientSettings::new(access_token)
            .with_endpoint(self.management_endpoint.clone())
            .with_timeout(Duration::from_secs(self.request_timeout_secs.max(1)))
    }
}

fn default_management_endpoint() -> String {
    DEFAULT_MANAGEMENT_ENDPOINT.to_string()
}

fn default_max_workers() -> usize {
    4
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Get the path to the funcscan config directory (~/.funcscan/)
pub fn config_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().context("failed to determine home directory")?;
    Ok(base_dirs.home_dir().join(CONFIG_DIR))
}

/// Get the path to the config file (~/.funcscan/config.yaml)
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Get the path to the credentials file (~/.funcscan/credentials)
pub fn credentials_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CREDENTIALS_FILE))
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    Ok(dir)
}

/// Load configuration from disk
pub fn load_config() -> Result<FuncscanConfig> {
    let path = config_file_path()?;
    if !path.exists() {
        return Ok(FuncscanConfig::default());
    }

    let contents =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;

    parse_config(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<FuncscanConfig> {
    if contents.trim().is_empty() {
        return Ok(FuncscanConfig::default());
    }
    Ok(serde_yaml::from_str(contents)?)
}

/// Save configuration to disk
pub fn save_config(config: &FuncscanConfig) -> Result<PathBuf> {
    ensure_config_dir()?;
    let path = config_file_path()?;

    let contents = serde_yaml::to_string(config).context("failed to serialize config")?;

    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}

/// Save the access token to the credentials file with restricted permissions (0600)
pub fn save_credentials(access_token: &str) -> Result<()> {
    ensure_config_dir()?;
    let path = credentials_file_path()?;

    let contents = format!("{}={}\n", TOKEN_KEY, access_token);

    #[cfg(unix)]
    {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600) // Owner read/write only
            .open(&path)
            .with_context(|| format!("failed to create credentials file {}", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("failed to write credentials to {}", path.display()))?;
        return Ok(());
    }

    #[cfg(not(unix))]
    {
        fs::write(&path, contents)
            .with_context(|| format!("failed to write credentials to {}", path.display()))?;
        Ok(())
    }
}

/// Load the access token from the credentials file
pub fn load_credentials() -> Result<Option<String>> {
    let path = credentials_file_path()?;
    if !path.exists() {
        return Ok(None);
    }

    let contents =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;

    Ok(parse_credentials(&contents))
}

/// Parse simple KEY=VALUE format
fn parse_credentials(contents: &str) -> Option<String> {
    let prefix = format!("{}=", TOKEN_KEY);
    contents
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(prefix.as_str()))
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}

/// Delete stored credentials
pub fn delete_credentials() -> Result<bool> {
    let path = credentials_file_path()?;
    if path.exists() {
        fs::remove_file(&path).with_context(|| format!("failed to delete {}", path.display()))?;
        return Ok(true);
    }
    Ok(false)
}

/// Token from `--access-token`/`AZURE_ACCESS_TOKEN`, else the credentials file
pub fn resolve_access_token(explicit: Option<&str>) -> Result<String> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }

    load_credentials()?.context(
        "no access token available. Pass --access-token, set AZURE_ACCESS_TOKEN, or run 'funcscan config set-token'",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FuncscanConfig::default();
        assert_eq!(config.management_endpoint, "https://management.azure.com");
        assert_eq!(config.default_strategy, Strategy::Graph);
        assert_eq!(config.max_workers, 4);
        assert!(config.subscriptions.is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            "default_strategy: resource-group\nsubscriptions:\n  - 00000000-0000-0000-0000-000000000001\n",
        )
        .unwrap();
        assert_eq!(config.default_strategy, Strategy::ResourceGroup);
        assert_eq!(config.subscriptions.len(), 1);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_parse_empty_config() {
        assert_eq!(parse_config("").unwrap(), FuncscanConfig::default());
    }

    #[test]
    fn test_config_round_trip() {
        let config = FuncscanConfig {
            max_workers: 8,
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(parse_config(&yaml).unwrap(), config);
    }

    #[test]
    fn test_parse_credentials() {
        assert_eq!(
            parse_credentials("# stored token\nAZURE_ACCESS_TOKEN=eyJ0eXAi\n"),
            Some("eyJ0eXAi".to_string())
        );
        assert_eq!(parse_credentials("AZURE_ACCESS_TOKEN=\n"), None);
        assert_eq!(parse_credentials(""), None);
    }

    #[test]
    fn test_explicit_token_wins() {
        assert_eq!(resolve_access_token(Some(" abc ")).unwrap(), "abc");
    }
}
