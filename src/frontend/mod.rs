mod dialog;
mod terminal;

use std::{
    fmt,
    path::{Path, PathBuf},
};

pub use dialog::DialogFrontend;
pub use terminal::TerminalFrontend;

use crate::{
    error::Error,
    game::Game,
    installation::GameInstall,
    plan::{CopyAction, InstallReport},
};

/// How many conflicting files are listed before the rest is summarized.
pub const CONFLICT_PREVIEW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    Replace,
    Skip,
    Cancel,
}

impl fmt::Display for ConflictChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictChoice::Replace => "Replace",
            ConflictChoice::Skip => "Skip",
            ConflictChoice::Cancel => "Cancel",
        })
    }
}

#[derive(Debug)]
pub enum Notice<'a> {
    Success(&'a InstallReport),
    Cancelled,
    Error(&'a Error),
}

/// The user facing side of the installer.
///
/// Every `pick_*` method returns `None` when the user dismisses the prompt.
pub trait Frontend {
    fn pick_game(&mut self, current: Game) -> Option<Game>;

    /// A map file or a map folder.
    fn pick_map(&mut self, start: &Path) -> Option<PathBuf>;

    fn pick_game_dir(&mut self, game: Game, start: &Path) -> Option<PathBuf>;

    fn resolve_conflicts(&mut self, install: &GameInstall, conflicts: &[&CopyAction])
        -> ConflictChoice;

    fn confirm(&mut self, title: &str, question: &str) -> bool;

    fn notify(&mut self, notice: Notice);
}

/// Text used by frontends for the success message.
pub fn success_message(report: &InstallReport) -> String {
    let mut message = String::from("Installing map finished successfully.");
    if report.is_noop() && !report.skipped.is_empty() {
        message.push_str("\nThe map was already installed, nothing was copied.");
    } else if !report.skipped.is_empty() {
        message.push_str(&format!(
            "\n{} file(s) copied, {} file(s) skipped.",
            report.copied.len(),
            report.skipped.len()
        ));
    }
    message
}

/// Text used by frontends to ask about overlapping files.
pub fn conflict_message(install: &GameInstall, conflicts: &[&CopyAction]) -> String {
    let mut message = format!(
        "Some files in {} overlap with files of the map.\nDo you want to replace these files or skip them?\n",
        install.root().display()
    );
    for action in conflicts.iter().take(CONFLICT_PREVIEW) {
        message.push_str(&format!("\n{}", action.target().display()));
    }
    if conflicts.len() > CONFLICT_PREVIEW {
        message.push_str(&format!("\n... and {} more", conflicts.len() - CONFLICT_PREVIEW));
    }
    message
}
