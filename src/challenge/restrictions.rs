//! Restriction evaluation against the live player and world.
//!
//! | type         | satisfied when                                              |
//! |--------------|-------------------------------------------------------------|
//! | `hardcore`   | the world's hardcore flag equals the content (`"true"`)      |
//! | `gamemode`   | the player's game mode equals the content, ignoring case     |
//! | `difficulty` | the world's difficulty name equals the content exactly      |
//!
//! Anything else logs a warning and counts as unmet, as does an entry that did not
//! parse.

use log::warn;

use super::{ChallengeDescriptor, Restriction};
use crate::chat::ChatLine;
use crate::host::PlayerHandle;
use crate::logutil::escape_log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionType {
    Hardcore,
    GameMode,
    Difficulty,
}

impl RestrictionType {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "hardcore" => Some(RestrictionType::Hardcore),
            "gamemode" => Some(RestrictionType::GameMode),
            "difficulty" => Some(RestrictionType::Difficulty),
            _ => None,
        }
    }
}

/// Why a player currently cannot complete objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// Permission level 2 or above.
    Operator,
    RestrictionsNotMet,
}

impl Ineligibility {
    /// The chat warning for this reason.
    pub fn warning(&self) -> ChatLine {
        match self {
            Ineligibility::Operator => ChatLine::commands_enabled_warning(),
            Ineligibility::RestrictionsNotMet => ChatLine::restrictions_warning(),
        }
    }
}

/// `"true"` in any case is true, everything else is false.
fn parse_flag(content: &str) -> bool {
    content.eq_ignore_ascii_case("true")
}

pub fn check_restriction(player: &dyn PlayerHandle, restriction: &Restriction) -> bool {
    if restriction.malformed {
        return false;
    }
    let world = player.world();
    match RestrictionType::parse(&restriction.kind) {
        Some(RestrictionType::Hardcore) => world.is_hardcore() == parse_flag(&restriction.content),
        Some(RestrictionType::GameMode) => {
            player.game_mode().name().to_lowercase() == restriction.content.to_lowercase()
        }
        Some(RestrictionType::Difficulty) => world.difficulty() == restriction.content,
        None => {
            warn!("Unknown restriction type: {}", escape_log(&restriction.kind));
            false
        }
    }
}

pub fn all_restrictions_met(player: &dyn PlayerHandle, restrictions: &[Restriction]) -> bool {
    restrictions.iter().all(|r| check_restriction(player, r))
}

/// `None` when the player may complete objectives right now.
pub fn ineligibility(
    player: &dyn PlayerHandle,
    descriptor: &ChallengeDescriptor,
) -> Option<Ineligibility> {
    if player.is_operator() {
        Some(Ineligibility::Operator)
    } else if !all_restrictions_met(player, &descriptor.restrictions()) {
        Some(Ineligibility::RestrictionsNotMet)
    } else {
        None
    }
}

pub fn can_complete(player: &dyn PlayerHandle, descriptor: &ChallengeDescriptor) -> bool {
    ineligibility(player, descriptor).is_none()
}
