use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, IoResultExt, Result},
    game::Game,
    map::MAPS_DIR_NAME,
    utils,
};

/// What to do when a game installation has no maps directory yet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapsDirPolicy {
    /// Create it during the install.
    #[default]
    Create,
    /// Reject the installation.
    Require,
}

/// A validated game installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInstall {
    game: Game,
    root: PathBuf,
    content_dir: PathBuf,
}

impl GameInstall {
    /// Validates `path` as an installation of `game`.
    ///
    /// `path` may be the installation root (containing `cstrike`/`czero`) or the
    /// game's content directory itself.
    pub fn locate(path: &Path, game: Game, policy: MapsDirPolicy) -> Result<Self> {
        if !utils::is_directory(path).with_path(path)? {
            return Err(Error::GameDirectoryNotFound(path.to_owned()));
        }
        let root = path.canonicalize().with_path(path)?;

        let nested = root.join(game.dir_name());
        let content_dir = if utils::is_directory(&nested).with_path(&nested)? {
            nested
        } else if utils::has_name(&root, game.dir_name())
            || utils::is_directory(root.join(MAPS_DIR_NAME)).with_path(&root)?
        {
            root.clone()
        } else {
            return Err(Error::InvalidGameDirectory { path: root, game });
        };

        let install = Self {
            game,
            root,
            content_dir,
        };
        let maps_dir = install.maps_dir();
        if policy == MapsDirPolicy::Require && !utils::is_directory(&maps_dir).with_path(&maps_dir)? {
            return Err(Error::MissingMapsDirectory(maps_dir));
        }

        log::debug!(
            "{} installation at {} (content {})",
            game,
            install.root.display(),
            install.content_dir.display()
        );
        Ok(install)
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.content_dir.join(MAPS_DIR_NAME)
    }
}
