//! # Session orchestration
//!
//! Join flow for a connecting player:
//!
//! 1. Resolve the player's world identifier.
//! 2. Check the player's profile in the background.
//! 3. Back on the main thread, consume the profile rendezvous:
//!    `NotFound` disconnects with the registration prompt and stops,
//!    `Error` sends the server error notice and continues, nothing means no objection.
//! 4. Greet, list restrictions and objectives with their state, warn if the player
//!    cannot complete objectives.
//!
//! [`OperatorWatch`] reports changes of operator status between ticks.

use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::challenge::restrictions;
use crate::challenge::ChallengeLoader;
use crate::chat::{self, ChatLine, Color};
use crate::host::PlayerHandle;
use crate::remote::{ProfileCheckResults, ProfileOutcome, ProfileStatus, ReportingClient};
use crate::scheduler::MainThreadHandle;
use crate::storage::PlayerProgressStore;
use crate::world_identity::WorldIdentityService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// No profile on the remote service; the player was disconnected.
    Disconnected,
    /// Greeting and challenge overview were sent.
    Welcomed,
}

#[derive(Clone)]
pub struct SessionOrchestrator {
    loader: ChallengeLoader,
    identities: Arc<WorldIdentityService>,
    progress: Arc<PlayerProgressStore>,
    client: ReportingClient,
    results: Arc<ProfileCheckResults>,
    main_thread: MainThreadHandle,
}

impl SessionOrchestrator {
    pub fn new(
        loader: ChallengeLoader,
        identities: Arc<WorldIdentityService>,
        progress: Arc<PlayerProgressStore>,
        client: ReportingClient,
        main_thread: MainThreadHandle,
    ) -> Self {
        let results = client.results().clone();
        Self {
            loader,
            identities,
            progress,
            client,
            results,
            main_thread,
        }
    }

    /// Start the join flow. The returned handle resolves once the profile check has
    /// finished and the rest of the flow is queued for the main thread.
    pub fn on_player_join(&self, player: Arc<dyn PlayerHandle>) -> JoinHandle<ProfileOutcome> {
        let world_id = self.identities.get_or_create(player.world());
        let uuid = player.uuid();
        info!("Player {} ({}) joined world {}", player.name(), uuid, world_id);

        let this = self.clone();
        self.client.runtime().spawn(async move {
            let outcome = this.client.check_profile(&uuid).await;
            debug!("Profile check for {} finished: {:?}", uuid, outcome);
            let main = this.main_thread.clone();
            main.execute(move || {
                this.finish_join(player.as_ref(), &world_id);
            });
            outcome
        })
    }

    /// Consume the profile rendezvous and either disconnect or welcome the player.
    pub fn finish_join(&self, player: &dyn PlayerHandle, world_id: &str) -> JoinOutcome {
        match self.results.take_result(&player.uuid()) {
            Some(ProfileStatus::NotFound) => {
                info!("Disconnecting {}: no Weekly World profile", player.name());
                player.disconnect(ChatLine::colored(chat::REGISTRATION_PROMPT, Color::Yellow));
                return JoinOutcome::Disconnected;
            }
            Some(ProfileStatus::Error) => {
                player.send_message(ChatLine::colored(chat::SERVER_ERROR, Color::Red));
            }
            None => {}
        }
        self.complete_join(player, world_id);
        JoinOutcome::Welcomed
    }

    /// Greeting plus the restriction and objective checklists.
    pub fn complete_join(&self, player: &dyn PlayerHandle, world_id: &str) {
        let descriptor = self.loader.load();
        let uuid = player.uuid();

        player.send_message(ChatLine::greeting());

        let restriction_list = descriptor.restrictions();
        if !restriction_list.is_empty() {
            player.send_message(ChatLine::plain(chat::RESTRICTIONS_HEADER).bold());
            let mut all_met = true;
            for restriction in &restriction_list {
                let met = restrictions::check_restriction(player, restriction);
                all_met &= met;
                player.send_message(ChatLine::checklist(met, &restriction.label()));
            }
            if !all_met {
                player.send_message(ChatLine::restrictions_warning());
            }
        }

        let tasks = descriptor.tasks();
        if !tasks.is_empty() {
            player.send_message(ChatLine::objectives_header(tasks.len()));
            for objective in &tasks {
                let done = self
                    .progress
                    .is_completed(&uuid, world_id, &objective.kind, &objective.content);
                player.send_message(ChatLine::checklist(done, &objective.label()));
            }
        }

        if let Some(reason) = restrictions::ineligibility(player, &descriptor) {
            player.send_message(reason.warning());
        }
    }
}

/// Remembers each player's operator status between ticks.
#[derive(Debug, Default)]
pub struct OperatorWatch {
    last: Mutex<HashMap<String, bool>>,
}

impl OperatorWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the last tick and notify the player on a change.
    /// Returns the new state when it changed.
    pub fn tick(&self, player: &dyn PlayerHandle) -> Option<bool> {
        let now = player.is_operator();
        let previous = self
            .last
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(player.uuid(), now);
        match previous {
            Some(was) if was != now => {
                if now {
                    player.send_message(ChatLine::commands_enabled_warning());
                } else {
                    player.send_message(ChatLine::colored(chat::NO_LONGER_OPERATOR, Color::Green));
                }
                Some(now)
            }
            _ => None,
        }
    }

    pub fn forget(&self, player_uuid: &str) {
        self.last
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(player_uuid);
    }
}
