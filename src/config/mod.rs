use anyhow::{Context, Result, bail};
use configparser::ini::Ini;
use std::net::SocketAddr;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

/// `[log]` section
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
  /// Append logs to this file instead of stdout
  pub file: Option<String>,
  /// `EnvFilter` directive such as `info` or `shelfdb=debug`
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      file: None,
      level: DEFAULT_LOG_LEVEL.to_string(),
    }
  }
}

/// ShelfDB configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  /// HTTP listening address
  pub server_addr: String,

  /// Log configuration
  pub log: LogConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      server_addr: DEFAULT_SERVER_ADDR.to_string(),
      log: LogConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from an INI file
  ///
  /// ```ini
  /// [server]
  /// addr = 0.0.0.0:8080
  ///
  /// [log]
  /// level = debug
  /// file = /var/log/shelfdb.log
  /// ```
  pub fn from_file(path: &str) -> Result<Self> {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file '{}'", path))?;
    Self::parse(&content).with_context(|| format!("Failed to parse config file '{}'", path))
  }

  /// Parse configuration from INI text, missing keys keep their defaults
  pub fn parse(content: &str) -> Result<Self> {
    let mut ini = Ini::new();
    ini.read(content.to_string()).map_err(anyhow::Error::msg)?;

    let mut config = Config::default();
    if let Some(addr) = ini.get("server", "addr") {
      config.server_addr = addr;
    }
    if let Some(level) = ini.get("log", "level") {
      config.log.level = level;
    }
    config.log.file = ini.get("log", "file").filter(|f| !f.is_empty());

    config.validate()?;
    Ok(config)
  }

  /// Check that the listening address is usable
  pub fn validate(&self) -> Result<()> {
    if self.server_addr.parse::<SocketAddr>().is_err() {
      bail!("invalid server address '{}'", self.server_addr);
    }
    if self.log.level.trim().is_empty() {
      bail!("log level must not be empty");
    }
    Ok(())
  }
}
