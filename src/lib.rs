pub mod config;
pub mod controller;
pub mod detect;
pub mod error;
pub mod frontend;
pub mod game;
pub mod installation;
pub mod map;
pub mod plan;
pub mod utils;
pub mod vdf;

pub use config::{Config, ConfigError};
pub use controller::{Controller, InstallOutcome, Selection, Session};
pub use detect::{Detected, Detector};
pub use error::{Error, ErrorKind, Result};
pub use frontend::{ConflictChoice, DialogFrontend, Frontend, Notice, TerminalFrontend};
pub use game::Game;
pub use installation::{GameInstall, MapsDirPolicy};
pub use map::{MapLayout, MapMatcher, MapSource};
pub use plan::{CopyStatus, InstallPlan, InstallReport, OverwritePolicy, Resolution};

pub const APP_NAME: &str = "CS:CZ Map Installer";
