use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dps-portal";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for header (defaults to the school name)
  pub title: Option<String>,
  /// Where the cache database, session and logs live
  pub data_dir: Option<PathBuf>,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
  #[serde(default)]
  pub notices: NoticesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Portal endpoint; each request appends `?task=<name>`
  pub url: String,
  /// Request timeout. Unset means the HTTP client's default.
  pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// tracing filter directive, overridden by DPS_LOG
  #[serde(default = "default_log_level")]
  pub level: String,
  pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      directory: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoticesConfig {
  /// Initial date window for the notice board, 0 shows everything
  #[serde(default = "default_notice_window")]
  pub window_days: u32,
}

impl Default for NoticesConfig {
  fn default() -> Self {
    Self {
      window_days: default_notice_window(),
    }
  }
}

fn default_true() -> bool {
  true
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_notice_window() -> u32 {
  30
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./dps.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/dps-portal/config.yaml
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

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => {
        return Err(eyre!(
          "No configuration file found. Create one at ~/.config/{}/config.yaml\n\
                 See config.example.yaml for the format.",
          APP_DIR
        ))
      }
    };

    if let Ok(url) = std::env::var("DPS_API_URL") {
      config.api.url = url;
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("dps.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join(APP_DIR).join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if config.api.url.trim().is_empty() {
      return Err(eyre!("api.url must not be empty"));
    }
    Ok(config)
  }

  pub fn display_title(&self) -> &str {
    self.title.as_deref().unwrap_or("DPS Mushkipur")
  }

  /// Base directory for everything the portal persists.
  pub fn data_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.data_dir {
      return Ok(dir.clone());
    }

    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join(APP_DIR))
  }

  pub fn cache_path(&self) -> Result<PathBuf> {
    match &self.cache.path {
      Some(path) => Ok(path.clone()),
      None => Ok(self.data_dir()?.join("cache.db")),
    }
  }

  pub fn session_path(&self) -> Result<PathBuf> {
    Ok(self.data_dir()?.join("session.json"))
  }

  pub fn log_dir(&self) -> Result<PathBuf> {
    match &self.logging.directory {
      Some(dir) => Ok(dir.clone()),
      None => Ok(self.data_dir()?.join("logs")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::from_yaml("api:\n  url: https://portal.example/api.php\n").unwrap();
    assert!(config.cache.enabled);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.notices.window_days, 30);
    assert_eq!(config.api.timeout_secs, None);
    assert_eq!(config.display_title(), "DPS Mushkipur");
  }

  #[test]
  fn test_full_config() {
    let yaml = r#"
api:
  url: https://portal.example/api.php
  timeout_secs: 15
title: DPS Test
data_dir: /tmp/dps
cache:
  enabled: false
logging:
  level: debug
notices:
  window_days: 0
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.api.timeout_secs, Some(15));
    assert!(!config.cache.enabled);
    assert_eq!(config.display_title(), "DPS Test");
    assert_eq!(config.notices.window_days, 0);
    assert_eq!(
      config.cache_path().unwrap(),
      PathBuf::from("/tmp/dps/cache.db")
    );
    assert_eq!(
      config.session_path().unwrap(),
      PathBuf::from("/tmp/dps/session.json")
    );
    assert_eq!(config.log_dir().unwrap(), PathBuf::from("/tmp/dps/logs"));
  }

  #[test]
  fn test_empty_url_is_rejected() {
    assert!(Config::from_yaml("api:\n  url: \"  \"\n").is_err());
  }

  #[test]
  fn test_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/dps.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
