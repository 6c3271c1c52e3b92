use std::path::{Path, PathBuf};

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use super::{conflict_message, success_message, ConflictChoice, Frontend, Notice};
use crate::{game::Game, installation::GameInstall, plan::CopyAction, APP_NAME};

const FILE_BUTTON: &str = "File";
const FOLDER_BUTTON: &str = "Folder";
const QUIT_BUTTON: &str = "Quit";

/// Native dialogs of the host system.
#[derive(Debug, Default)]
pub struct DialogFrontend {
    map_extensions: Vec<String>,
}

impl DialogFrontend {
    /// `map_extensions` filters the map file picker. An "All files" filter is always offered.
    pub fn new(map_extensions: Vec<String>) -> Self {
        Self { map_extensions }
    }

    fn message(&self, level: MessageLevel, title: &str, description: &str) -> MessageDialog {
        MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(description)
    }
}

impl Frontend for DialogFrontend {
    fn pick_game(&mut self, current: Game) -> Option<Game> {
        let result = self
            .message(
                MessageLevel::Info,
                APP_NAME,
                &format!("Which game should the map be installed into?\n(last used: {current})"),
            )
            .set_buttons(MessageButtons::YesNoCancelCustom(
                Game::ConditionZero.display_name().to_string(),
                Game::CounterStrike.display_name().to_string(),
                QUIT_BUTTON.to_string(),
            ))
            .show();
        match result {
            MessageDialogResult::Yes => Some(Game::ConditionZero),
            MessageDialogResult::No => Some(Game::CounterStrike),
            MessageDialogResult::Custom(label) => Game::ALL
                .into_iter()
                .find(|game| game.display_name() == label),
            _ => None,
        }
    }

    fn pick_map(&mut self, start: &Path) -> Option<PathBuf> {
        let kind = self
            .message(
                MessageLevel::Info,
                APP_NAME,
                "Install a single .bsp map file or a whole map folder?",
            )
            .set_buttons(MessageButtons::YesNoCancelCustom(
                FILE_BUTTON.to_string(),
                FOLDER_BUTTON.to_string(),
                QUIT_BUTTON.to_string(),
            ))
            .show();
        let pick_file = match kind {
            MessageDialogResult::Yes => true,
            MessageDialogResult::No => false,
            MessageDialogResult::Custom(label) if label == FILE_BUTTON => true,
            MessageDialogResult::Custom(label) if label == FOLDER_BUTTON => false,
            _ => return None,
        };

        let dialog = FileDialog::new().set_directory(start);
        if pick_file {
            let mut dialog = dialog.set_title("Select map file");
            if !self.map_extensions.is_empty() {
                dialog = dialog.add_filter("Map files", self.map_extensions.as_slice());
            }
            dialog.add_filter("All files", &["*"]).pick_file()
        } else {
            dialog.set_title("Select map directory").pick_folder()
        }
    }

    fn pick_game_dir(&mut self, game: Game, start: &Path) -> Option<PathBuf> {
        FileDialog::new()
            .set_title(format!("Select {game} game directory"))
            .set_directory(start)
            .pick_folder()
    }

    fn resolve_conflicts(
        &mut self,
        install: &GameInstall,
        conflicts: &[&CopyAction],
    ) -> ConflictChoice {
        let result = self
            .message(
                MessageLevel::Warning,
                "Replace files?",
                &conflict_message(install, conflicts),
            )
            .set_buttons(MessageButtons::YesNoCancelCustom(
                ConflictChoice::Replace.to_string(),
                ConflictChoice::Skip.to_string(),
                ConflictChoice::Cancel.to_string(),
            ))
            .show();
        match result {
            MessageDialogResult::Yes => ConflictChoice::Replace,
            MessageDialogResult::No => ConflictChoice::Skip,
            MessageDialogResult::Custom(label) if label == ConflictChoice::Replace.to_string() => {
                ConflictChoice::Replace
            }
            MessageDialogResult::Custom(label) if label == ConflictChoice::Skip.to_string() => {
                ConflictChoice::Skip
            }
            _ => ConflictChoice::Cancel,
        }
    }

    fn confirm(&mut self, title: &str, question: &str) -> bool {
        let result = self
            .message(MessageLevel::Info, title, question)
            .set_buttons(MessageButtons::YesNo)
            .show();
        matches!(result, MessageDialogResult::Yes)
    }

    fn notify(&mut self, notice: Notice) {
        let dialog = match notice {
            Notice::Success(report) => {
                self.message(MessageLevel::Info, "Success", &success_message(report))
            }
            Notice::Cancelled => {
                self.message(MessageLevel::Warning, "Canceled", "Operation canceled")
            }
            Notice::Error(e) => self.message(MessageLevel::Error, "Error", &e.to_string()),
        };
        dialog.set_buttons(MessageButtons::Ok).show();
    }
}
