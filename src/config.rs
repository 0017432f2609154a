//! `config.yml` loading and install parameter resolution.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// File name of the configuration file inside the dotfiles root.
pub const CONFIG_FILE: &str = "config.yml";

/// Number of backup buckets kept when `keep_max_count` is not configured.
pub const DEFAULT_KEEP_MAX_COUNT: i64 = 10;

/// Contents of `config.yml`.
///
/// Every key is optional. Empty strings are treated the same as absent keys
/// so that the file written by `init` behaves like no configuration at all.
///
/// # Examples
///
/// ```
/// use flexdot_cli::config::Config;
///
/// let config = Config::from_yaml_str("keep_max_count: 3\nhome_dir: ''\n").unwrap();
/// assert_eq!(config.keep_max_count(), 3);
/// assert_eq!(config.home_dir(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of backup buckets to keep; `<= 0` disables pruning.
    #[serde(default)]
    pub keep_max_count: Option<i64>,
    /// Destination root for links.
    #[serde(default)]
    pub home_dir: Option<String>,
    /// Path to the index definition, relative to the dotfiles root unless absolute.
    #[serde(default)]
    pub index_yml: Option<String>,
}

impl Config {
    /// The configuration written by `flexdot init`.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            keep_max_count: Some(DEFAULT_KEEP_MAX_COUNT),
            home_dir: Some(String::new()),
            index_yml: Some(String::new()),
        }
    }

    /// Parse configuration from YAML text. Blank text yields an empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML or a key has the wrong type.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content)
    }

    /// Load `config.yml` from `root`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        Self::from_yaml_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse { path, source })
    }

    /// Write the default configuration to `root/config.yml`, refusing to
    /// overwrite an existing file. Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] if the file is already present,
    /// or an I/O error if it cannot be written.
    pub fn write_default(root: &Path) -> Result<PathBuf, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if path.symlink_metadata().is_ok() {
            return Err(ConfigError::AlreadyExists(path));
        }
        let yaml = serde_yaml_ng::to_string(&Self::with_defaults()).map_err(|source| {
            ConfigError::Parse {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(&path, yaml).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Retention count, falling back to [`DEFAULT_KEEP_MAX_COUNT`].
    #[must_use]
    pub fn keep_max_count(&self) -> i64 {
        self.keep_max_count.unwrap_or(DEFAULT_KEEP_MAX_COUNT)
    }

    /// Configured destination root, if set and non-empty.
    #[must_use]
    pub fn home_dir(&self) -> Option<&str> {
        self.home_dir.as_deref().filter(|s| !s.is_empty())
    }

    /// Configured index path, if set and non-empty.
    #[must_use]
    pub fn index_yml(&self) -> Option<&str> {
        self.index_yml.as_deref().filter(|s| !s.is_empty())
    }
}

/// Fully resolved parameters for an install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallParams {
    /// Destination root that links are created under.
    pub home_dir: PathBuf,
    /// Absolute or root-relative path of the index definition.
    pub index_file: PathBuf,
    /// Retention count for backup buckets.
    pub keep_max_count: i64,
}

/// Resolve install parameters with precedence: CLI argument > `config.yml` > error.
///
/// A relative index path is resolved against `root`. A leading `~` in the
/// configured `home_dir` expands to `$HOME`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingHomeDir`] or [`ConfigError::MissingIndex`]
/// when neither source provides the value.
pub fn resolve_install(
    config: Option<&Config>,
    home_arg: Option<&Path>,
    index_arg: Option<&Path>,
    root: &Path,
) -> Result<InstallParams, ConfigError> {
    let home_dir = home_arg
        .map(Path::to_path_buf)
        .or_else(|| config.and_then(Config::home_dir).map(expand_home))
        .ok_or(ConfigError::MissingHomeDir)?;

    let index_file = index_arg
        .map(Path::to_path_buf)
        .or_else(|| config.and_then(Config::index_yml).map(PathBuf::from))
        .ok_or(ConfigError::MissingIndex)?;
    let index_file = if index_file.is_absolute() {
        index_file
    } else {
        root.join(index_file)
    };

    let keep_max_count = config.map_or(DEFAULT_KEEP_MAX_COUNT, Config::keep_max_count);

    Ok(InstallParams {
        home_dir,
        index_file,
        keep_max_count,
    })
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    let home = || {
        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from)
    };
    if path == "~" {
        return home().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = home()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
