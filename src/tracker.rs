//! Event matching and objective completion.
//!
//! [`ChallengeTracker::report_event`] is the single entry point for game events.
//! It runs on the main thread, reads the challenge descriptor once, completes at
//! most one objective and, when that completion finishes the week, submits it to
//! the remote service in the background.

use log::{debug, info};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::challenge::restrictions::{self, Ineligibility};
use crate::challenge::ChallengeLoader;
use crate::chat::{self, ChatLine, Color};
use crate::host::PlayerHandle;
use crate::logutil::escape_log;
use crate::remote::{ReportingClient, SubmitOutcome};
use crate::storage::PlayerProgressStore;
use crate::world_identity::WorldIdentityService;

/// What a reported event did.
#[derive(Debug)]
pub enum EventOutcome {
    /// No objective of the current week matches the event.
    Unmatched,
    /// The matching objective was already completed in this world.
    AlreadyCompleted,
    /// The player may not complete objectives; one warning was sent.
    Blocked(Ineligibility),
    Completed,
    /// This completion finished every objective; the submission is in flight.
    WeekCompleted(JoinHandle<SubmitOutcome>),
}

impl EventOutcome {
    pub fn is_completion(&self) -> bool {
        matches!(self, EventOutcome::Completed | EventOutcome::WeekCompleted(_))
    }
}

pub struct ChallengeTracker {
    loader: ChallengeLoader,
    identities: Arc<WorldIdentityService>,
    progress: Arc<PlayerProgressStore>,
    client: ReportingClient,
}

impl ChallengeTracker {
    pub fn new(
        loader: ChallengeLoader,
        identities: Arc<WorldIdentityService>,
        progress: Arc<PlayerProgressStore>,
        client: ReportingClient,
    ) -> Self {
        Self {
            loader,
            identities,
            progress,
            client,
        }
    }

    /// Match `(kind, value)` against the week's objectives for this player.
    pub fn report_event(&self, player: &dyn PlayerHandle, kind: &str, value: &str) -> EventOutcome {
        let world_id = self.identities.get_or_create(player.world());
        let uuid = player.uuid();
        debug!(
            "Event reported: player {} type {} value {} world {}",
            uuid,
            escape_log(kind),
            escape_log(value),
            escape_log(&world_id)
        );

        let descriptor = self.loader.load();
        let tasks = descriptor.tasks();
        let Some(objective) = tasks.iter().find(|o| o.matches(kind, value)) else {
            return EventOutcome::Unmatched;
        };

        if self.progress.is_completed(&uuid, &world_id, kind, value) {
            debug!("Objective {} already completed by {}", objective.key(), uuid);
            return EventOutcome::AlreadyCompleted;
        }

        if let Some(reason) = restrictions::ineligibility(player, &descriptor) {
            debug!("Player {} cannot complete {}: {:?}", uuid, objective.key(), reason);
            player.send_message(reason.warning());
            return EventOutcome::Blocked(reason);
        }

        let added = self.progress.mark_completed(&uuid, &world_id, kind, value);
        let label = objective.label();
        info!("Player {} completed objective {} in world {}", player.name(), objective.key(), escape_log(&world_id));
        player.send_message(ChatLine::colored(
            format!("Objective completed: {}", label),
            Color::Green,
        ));

        // Only the call that inserted the last key reports the week.
        let all_done = tasks
            .iter()
            .all(|o| self.progress.is_completed(&uuid, &world_id, &o.kind, &o.content));
        if !(added && all_done) {
            return EventOutcome::Completed;
        }

        let week = descriptor.week();
        info!("Player {} completed all objectives of week {}", player.name(), week);
        player.send_message(ChatLine::colored(chat::WEEK_COMPLETED, Color::Gold).bold());
        let submission = self.client.submit_completion_async(uuid, week);
        player.send_message(ChatLine::colored(chat::COMPLETION_RECORDED, Color::Green));
        EventOutcome::WeekCompleted(submission)
    }
}
