use std::{env, fmt, fs, io, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::{DEFAULT_CATEGORY, DEFAULT_CHECK_INTERVAL, NewTarget};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadFailed(#[source] io::Error),
    #[error("failed to write config: {0}")]
    WriteFailed(#[source] io::Error),
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config directory available; set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// Targets created on startup if their URL is not stored yet
    pub defaults: Vec<SeedTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: path::PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

/// A target created on startup. The URL is looked up in `url_env` on every
/// seeding run and falls back to `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTarget {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_check_interval")]
    pub check_interval: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_check_interval() -> u32 {
    DEFAULT_CHECK_INTERVAL
}

fn default_active() -> bool {
    true
}

impl SeedTarget {
    /// The environment wins over the literal URL; blank values count as unset
    pub fn resolve_url(&self) -> Option<String> {
        let non_blank = |v: &String| !v.trim().is_empty();

        self.url_env
            .as_deref()
            .and_then(|var| env::var(var).ok())
            .filter(non_blank)
            .or_else(|| self.url.clone().filter(non_blank))
    }

    /// `None` when no URL is configured for this entry
    pub fn to_new_target(&self) -> Option<NewTarget> {
        Some(NewTarget {
            name: self.name.clone(),
            url: self.resolve_url()?,
            description: self.description.clone(),
            category: Some(self.category.clone()),
            check_interval: Some(self.check_interval),
            is_active: Some(self.is_active),
        })
    }
}

/// Upstream APIs the platform depends on, located through the environment
fn default_seed_targets() -> Vec<SeedTarget> {
    let known = [
        ("Hi-Anime API", "HI_ANIME_API", "Hi Anime API", 300),
        ("M3U8-Proxy", "M3_U8_PROXY_API", "M3U8-Proxy Video Streaming API", 600),
    ];

    known
        .into_iter()
        .map(|(name, var, description, check_interval)| SeedTarget {
            name: name.to_string(),
            url: None,
            url_env: Some(var.to_string()),
            description: Some(description.to_string()),
            category: "anime".to_string(),
            check_interval,
            is_active: true,
        })
        .collect()
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/kokoromi/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("kokoromi/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            defaults: default_seed_targets(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: path::PathBuf::from("kokoromi.db") }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 1337 }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path.display())?;
        write_title_1(f, "Server")?;
        write_1(f, "Bind Address", &self.server.bind)?;
        write_1(f, "Port", &self.server.port)?;
        write_title_1(f, "Default APIs")?;
        if self.defaults.is_empty() {
            write_1(f, "(none)", &"")?;
        }
        for seed in &self.defaults {
            let url = seed.resolve_url().unwrap_or_else(|| "(unset)".to_string());
            write_1(f, &seed.name, &url)?;
            if let Some(var) = &seed.url_env {
                write_2(f, "From", &format_args!("${var}"))?;
            }
            write_2(f, "Interval", &format_args!("{}s", seed.check_interval))?;
        }

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/kokoromi/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```no_run
    /// let cfg = kokoromi_monitor::config::Config::from_config(None::<&std::path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), kokoromi_monitor::config::ConfigError>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::ReadFailed)?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        fs::write(path, config_str).map_err(ConfigError::WriteFailed)
    }
}
