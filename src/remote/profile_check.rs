//! Hand-off of profile check outcomes from HTTP workers to the join flow.
//!
//! A worker records an objection for a player; the join continuation on the main
//! thread takes it exactly once. No entry means "no objection".

use log::debug;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    /// The player has no account on the remote service.
    NotFound,
    /// The service answered with an unexpected status.
    Error,
}

#[derive(Debug, Default)]
pub struct ProfileCheckResults {
    slots: Mutex<HashMap<String, ProfileStatus>>,
}

impl ProfileCheckResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome. The first write for a player wins until it is taken.
    pub fn set_result(&self, player_uuid: &str, status: ProfileStatus) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = slots.get(player_uuid) {
            debug!(
                "Profile result for {} already pending ({:?}); ignoring {:?}",
                player_uuid, existing, status
            );
            return;
        }
        slots.insert(player_uuid.to_string(), status);
    }

    /// Read and remove the outcome for a player.
    pub fn take_result(&self, player_uuid: &str) -> Option<ProfileStatus> {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(player_uuid)
    }

    pub fn clear_result(&self, player_uuid: &str) {
        let _ = self.take_result(player_uuid);
    }

    pub fn pending(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
