//! Seams to the host game runtime.
//!
//! The core never talks to the game directly. A host adapter implements
//! [`PlayerHandle`] and [`WorldView`] over its live objects and forwards join,
//! event and lifecycle notifications into [`crate::WeeklyWorld`].

use bytes::Bytes;
use std::path::PathBuf;

use crate::chat::ChatLine;

/// Permission level at which a player counts as an operator.
pub const OPERATOR_PERMISSION_LEVEL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    /// Lower-case mode name as written in challenge restrictions.
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
            GameMode::Spectator => "spectator",
        }
    }
}

/// Read-only view of the world a player is currently in.
pub trait WorldView: Send + Sync {
    /// Root save path reported by the host, if it has one.
    fn save_root(&self) -> Option<PathBuf>;
    /// Level name from the save properties.
    fn level_name(&self) -> Option<String>;
    /// Dimension registry name, e.g. `minecraft:overworld`.
    fn dimension(&self) -> String;
    fn is_hardcore(&self) -> bool;
    /// Difficulty name as the host spells it, e.g. `hard`.
    fn difficulty(&self) -> String;
}

/// A connected player.
///
/// Implementations must be cheap to call from the main thread. Methods that
/// change what the player sees are only invoked from the main thread.
pub trait PlayerHandle: Send + Sync {
    fn uuid(&self) -> String;
    fn name(&self) -> String;
    fn permission_level(&self) -> u8;
    fn game_mode(&self) -> GameMode;
    fn world(&self) -> &dyn WorldView;
    fn send_message(&self, line: ChatLine);
    fn disconnect(&self, reason: ChatLine);
    /// Deliver a custom payload on a named channel.
    fn send_payload(&self, channel: &str, payload: Bytes);

    fn is_operator(&self) -> bool {
        self.permission_level() >= OPERATOR_PERMISSION_LEVEL
    }
}
