//! Static game registry.
//!
//! Games are loaded once at startup from a JSON file (see
//! `games.example.json`) or fall back to the built-in SKPort entry. The
//! registry is read-only for the process lifetime; adding or removing games
//! is an operator action, not a runtime capability.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{domain::GameName, token::TokenKind, Error, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    pub name: GameName,
    pub base_url: String,
    pub status_path: String,
    pub claim_path: String,
    pub required_token_kind: TokenKind,
}

#[derive(Clone, Debug)]
pub struct GameRegistry {
    games: Vec<Game>,
}

impl GameRegistry {
    /// The built-in registry: Arknights: Endfield on the SKPort web API.
    ///
    /// SKPort serves status (GET) and claim (POST) on the same attendance
    /// endpoint, so both paths point at it.
    pub fn builtin() -> Self {
        Self {
            games: vec![Game {
                name: GameName::new("endfield"),
                base_url: "https://zonai.skport.com/web/v1".to_string(),
                status_path: "/game/endfield/attendance".to_string(),
                claim_path: "/game/endfield/attendance".to_string(),
                required_token_kind: TokenKind::SessionToken,
            }],
        }
    }

    /// Load a registry from a JSON array of games.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let games: Vec<Game> = serde_json::from_str(&raw)?;
        if games.is_empty() {
            return Err(Error::Config(format!(
                "game registry {} contains no games",
                path.display()
            )));
        }
        Ok(Self { games })
    }

    pub fn get(&self, name: &GameName) -> Option<&Game> {
        self.games.iter().find(|g| &g.name == name)
    }

    pub fn contains(&self, name: &GameName) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &GameName> {
        self.games.iter().map(|g| &g.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_endfield() {
        let reg = GameRegistry::builtin();
        let game = reg.get(&GameName::new("endfield")).unwrap();
        assert_eq!(game.required_token_kind, TokenKind::SessionToken);
        assert!(game.base_url.starts_with("https://"));
    }

    #[test]
    fn unknown_game_is_none() {
        let reg = GameRegistry::builtin();
        assert!(reg.get(&GameName::new("hsr")).is_none());
    }

    #[test]
    fn loads_from_json_file() {
        let path = std::env::temp_dir().join(format!("ecb-games-{}.json", std::process::id()));
        let raw = r#"[
          {
            "name": "endfield",
            "base_url": "https://zonai.skport.com/web/v1",
            "status_path": "/game/endfield/attendance",
            "claim_path": "/game/endfield/attendance",
            "required_token_kind": "session-token"
          }
        ]"#;
        std::fs::write(&path, raw).unwrap();

        let reg = GameRegistry::load(&path).unwrap();
        assert!(reg.contains(&GameName::new("endfield")));
        assert_eq!(reg.names().count(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_registry_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("ecb-games-empty-{}.json", std::process::id()));
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(GameRegistry::load(&path), Err(Error::Config(_))));
        let _ = std::fs::remove_file(&path);
    }
}
