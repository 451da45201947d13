use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::services::FetchPolicy;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  #[serde(default)]
  pub account: AccountConfig,
  #[serde(default)]
  pub fetch: FetchConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Server root, e.g. https://agri.example.com
  pub url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountConfig {
  /// Prefills the login form
  pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchConfig {
  /// Share one request between overlapping fetches of the same endpoint
  #[serde(default)]
  pub single_flight: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Filter directive such as "info" or "agrilink=debug"
  pub level: Option<String>,
  /// Directory for rolling log files (default: <data dir>/agrilink/logs)
  pub dir: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./agrilink.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/agrilink/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/agrilink/config.yaml\n\
                 with at least:\n\n  api:\n    url: https://your-server.example.com"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("agrilink.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("agrilink").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if config.api.url.trim().is_empty() {
      return Err(eyre!("api.url must not be empty"));
    }
    Ok(config)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs.max(1))
  }

  pub fn fetch_policy(&self) -> FetchPolicy {
    if self.fetch.single_flight {
      FetchPolicy::SingleFlight
    } else {
      FetchPolicy::Duplicate
    }
  }

  /// Log directory, falling back to the platform data directory.
  pub fn log_dir(&self) -> PathBuf {
    self.log.dir.clone().unwrap_or_else(|| {
      dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("agrilink")
        .join("logs")
    })
  }

  /// Get the account password from the environment.
  ///
  /// Checks AGRILINK_PASSWORD. Absent means interactive login.
  pub fn get_password() -> Option<String> {
    std::env::var("AGRILINK_PASSWORD")
      .ok()
      .filter(|p| !p.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::parse("api:\n  url: https://agri.example.com\n").unwrap();
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.fetch_policy(), FetchPolicy::Duplicate);
    assert!(config.account.email.is_none());
    assert!(config.log.level.is_none());
  }

  #[test]
  fn test_full_config() {
    let yaml = r#"
api:
  url: http://localhost:8080
  timeout_secs: 5
account:
  email: grower@example.com
fetch:
  single_flight: true
log:
  level: debug
  dir: /tmp/agrilink-logs
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.account.email.as_deref(), Some("grower@example.com"));
    assert_eq!(config.fetch_policy(), FetchPolicy::SingleFlight);
    assert_eq!(config.log_dir(), PathBuf::from("/tmp/agrilink-logs"));
  }

  #[test]
  fn test_missing_api_url_is_an_error() {
    assert!(Config::parse("account:\n  email: a@b.c\n").is_err());
    assert!(Config::parse("api:\n  url: ''\n").is_err());
  }

  #[test]
  fn test_explicit_missing_path_is_an_error() {
    let err = Config::load(Some(Path::new("/nonexistent/agrilink.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
