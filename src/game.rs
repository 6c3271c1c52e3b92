use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The games a map can be installed into.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Game {
    #[default]
    #[serde(rename = "czero")]
    ConditionZero,
    #[serde(rename = "cstrike")]
    CounterStrike,
}

impl Game {
    pub const ALL: [Game; 2] = [Game::ConditionZero, Game::CounterStrike];

    /// Name of the game's content directory inside an installation.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Game::ConditionZero => "czero",
            Game::CounterStrike => "cstrike",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Game::ConditionZero => "Condition Zero",
            Game::CounterStrike => "Counter-Strike",
        }
    }

    /// The other supported game.
    pub fn other(&self) -> Game {
        match self {
            Game::ConditionZero => Game::CounterStrike,
            Game::CounterStrike => Game::ConditionZero,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown game '{0}', expected 'czero' or 'cstrike'")]
pub struct UnknownGame(String);

impl FromStr for Game {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "czero" | "cz" | "condition zero" => Ok(Game::ConditionZero),
            "cstrike" | "cs" | "counter-strike" | "counter strike" => Ok(Game::CounterStrike),
            _ => Err(UnknownGame(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_game_names() {
        assert_eq!("czero".parse::<Game>().unwrap(), Game::ConditionZero);
        assert_eq!("CStrike".parse::<Game>().unwrap(), Game::CounterStrike);
        assert_eq!(" cs ".parse::<Game>().unwrap(), Game::CounterStrike);
        assert!("hl2".parse::<Game>().is_err());
    }

    #[test]
    fn game_dir_names() {
        assert_eq!(Game::default().dir_name(), "czero");
        assert_eq!(Game::CounterStrike.dir_name(), "cstrike");
        assert_eq!(Game::CounterStrike.other(), Game::ConditionZero);
    }

    #[test]
    fn game_serde_uses_dir_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            game: Game,
        }
        let w: Wrapper = toml::from_str(r#"game = "cstrike""#).unwrap();
        assert_eq!(w.game, Game::CounterStrike);
    }
}
