//! Battle session context.
//!
//! Tracks whether the client is inside a battle, which room and which mode.
//! Navigation code asks [`BattleSession::exit_requires_confirmation`] before
//! leaving the battle screen; leaving counts as a loss. The session is owned
//! by whoever runs the battle and passed to the code that needs it.

use log::info;
use serde::{Deserialize, Serialize};

/// Supported battle formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    #[serde(rename = "1vs1")]
    OneVsOne,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BattleSession {
    room_id: Option<String>,
    mode: Option<GameMode>,
}

impl BattleSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `room_id`. Entering while already in a game switches rooms.
    pub fn enter(&mut self, room_id: impl Into<String>, mode: GameMode) {
        let room_id = room_id.into();
        info!("Entering battle room {} ({:?})", room_id, mode);
        self.room_id = Some(room_id);
        self.mode = Some(mode);
    }

    /// Leave the current game. Returns the room that was left, if any.
    pub fn leave(&mut self) -> Option<String> {
        self.mode = None;
        let left = self.room_id.take();
        if let Some(room) = &left {
            info!("Left battle room {}", room);
        }
        left
    }

    pub fn is_in_game(&self) -> bool {
        self.room_id.is_some()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    /// Leaving mid-game forfeits, so the user must confirm.
    pub fn exit_requires_confirmation(&self) -> bool {
        self.is_in_game()
    }
}
