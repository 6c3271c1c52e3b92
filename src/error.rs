use std::path::PathBuf;

use thiserror::Error;

use crate::{game::Game, vdf::ParseError};

/// Broad classification of an [`Error`], used by frontends to pick a message style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A selected path is not usable. Nothing was written.
    Validation,
    /// The filesystem refused an operation.
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Map path does not exist : {}", .0.display())]
    MapNotFound(PathBuf),
    #[error("Map path is not readable : {}\n{}", .0.display(), .1)]
    MapUnreadable(PathBuf, std::io::Error),
    #[error("Not a map file : {}", .0.display())]
    NotAMapFile(PathBuf),
    #[error("Invalid map directory : {} ({reason})", .path.display())]
    InvalidMapDirectory { path: PathBuf, reason: String },
    #[error("Game directory not found : {}", .0.display())]
    GameDirectoryNotFound(PathBuf),
    #[error(
        "Given game directory is not a valid {game} installation (\"{}\" not found) : {}",
        .game.dir_name(),
        .path.display()
    )]
    InvalidGameDirectory { path: PathBuf, game: Game },
    #[error("Maps directory does not exist : {}", .0.display())]
    MissingMapsDirectory(PathBuf),
    #[error("Entered map path and game path refer to the same directory : {}", .0.display())]
    SameDirectory(PathBuf),
    #[error("No {0} has been selected yet")]
    NotSelected(&'static str),
    #[error(
        "No permission to write to {game} directory, did you run the application as administrator? ({})",
        .path.display()
    )]
    PermissionDenied { path: PathBuf, game: Game },
    #[error("I/O error on {} : {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid map pattern : {0}")]
    Pattern(#[from] globset::Error),
    #[error("Failed to read {} : {source}", .path.display())]
    Vdf {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MapUnreadable(..)
            | Error::PermissionDenied { .. }
            | Error::Io { .. }
            | Error::Vdf { .. } => ErrorKind::Io,
            _ => ErrorKind::Validation,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Helper to attach the offending path to a raw [`std::io::Error`].
pub(crate) trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        assert_eq!(
            Error::MapNotFound(PathBuf::from("de_dust3.bsp")).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::io("maps", std::io::Error::from(std::io::ErrorKind::Other)).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn invalid_game_message_names_content_dir() {
        let err = Error::InvalidGameDirectory {
            path: PathBuf::from("/games/hl"),
            game: Game::CounterStrike,
        };
        let message = err.to_string();
        assert!(message.contains("Counter-Strike"));
        assert!(message.contains("\"cstrike\""));
    }
}
