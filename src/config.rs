//! Optional configuration file.
//!
//! Read from `--config <PATH>` or, if present, from `<config dir>/cs-cz-map-installer/config.toml`:
//!
//! ```toml
//! game = "cstrike"
//! search_roots = ["/mnt/games"]
//! detect_depth = 4
//! maps_dir = "create"    # or "require"
//! overwrite = "ask"      # or "replace" / "skip"
//! map_patterns = ["*.bsp"]
//! ```
//!
//! The file is never written by the installer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    detect::DEFAULT_DETECT_DEPTH, game::Game, installation::MapsDirPolicy,
    map::DEFAULT_MAP_PATTERNS, plan::OverwritePolicy,
};

pub const APP_DIR_NAME: &str = "cs-cz-map-installer";
pub const DEFAULT_CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {} : {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {} : {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Game selected on startup.
    pub game: Game,
    /// Extra directories searched for installations, before the platform defaults.
    pub search_roots: Vec<PathBuf>,
    /// Extra Steam installations whose libraries are probed.
    pub steam_roots: Vec<PathBuf>,
    pub detect_depth: usize,
    pub maps_dir: MapsDirPolicy,
    pub overwrite: OverwritePolicy,
    pub map_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: Game::default(),
            search_roots: Vec::new(),
            steam_roots: Vec::new(),
            detect_depth: DEFAULT_DETECT_DEPTH,
            maps_dir: MapsDirPolicy::default(),
            overwrite: OverwritePolicy::default(),
            map_patterns: DEFAULT_MAP_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(path, &content)
    }

    /// Loads `path` if given, otherwise the default config file if it exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => {
                    log::debug!("loading config from {}", path.display());
                    Self::load(&path)
                }
                _ => Ok(Self::default()),
            },
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config = Config::from_toml(Path::new("config.toml"), "").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.map_patterns, vec!["*.bsp".to_string()]);
    }

    #[test]
    fn full_file() {
        let config = Config::from_toml(
            Path::new("config.toml"),
            r#"
            game = "cstrike"
            search_roots = ["/mnt/games"]
            detect_depth = 2
            maps_dir = "require"
            overwrite = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(config.game, Game::CounterStrike);
        assert_eq!(config.search_roots, vec![PathBuf::from("/mnt/games")]);
        assert_eq!(config.detect_depth, 2);
        assert_eq!(config.maps_dir, MapsDirPolicy::Require);
        assert_eq!(config.overwrite, OverwritePolicy::Skip);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml(Path::new("config.toml"), "colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = Config::load_or_default(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
