//! Client-side objective display.
//!
//! On a client the world identifier arrives from the server after join, so the
//! objective list waits for the sync payload up to [`SYNC_WAIT`]. If the identifier
//! shows up in time the list carries completion state; otherwise every objective is
//! shown unchecked with a note that the state will follow.

use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::challenge::ChallengeLoader;
use crate::chat::{self, ChatLine, Color};
use crate::storage::PlayerProgressStore;
use crate::world_identity::{PayloadError, WorldIdPayload, SYNC_CHANNEL};

pub const SYNC_WAIT: Duration = Duration::from_secs(3);

pub struct ClientDisplay {
    loader: ChallengeLoader,
    progress: Arc<PlayerProgressStore>,
    world: watch::Sender<Option<String>>,
    sync_wait: Duration,
}

impl ClientDisplay {
    pub fn new(loader: ChallengeLoader, progress: Arc<PlayerProgressStore>) -> Self {
        let (world, _) = watch::channel(None);
        Self {
            loader,
            progress,
            world,
            sync_wait: SYNC_WAIT,
        }
    }

    pub fn with_sync_wait(mut self, wait: Duration) -> Self {
        self.sync_wait = wait;
        self
    }

    /// Handle a custom payload from the server. Returns `Ok(false)` for other
    /// channels.
    pub fn on_payload(&self, channel: &str, data: &[u8]) -> Result<bool, PayloadError> {
        if channel != SYNC_CHANNEL {
            return Ok(false);
        }
        let payload = WorldIdPayload::decode(data)?;
        debug!("Received world identifier from server: {}", payload.world_identifier);
        self.world.send_replace(Some(payload.world_identifier));
        Ok(true)
    }

    pub fn world_identifier(&self) -> Option<String> {
        self.world.borrow().clone()
    }

    pub fn on_disconnect(&self) {
        self.world.send_replace(None);
    }

    /// Lines to show after joining, waiting for the world identifier if needed.
    pub async fn on_join(&self, player_uuid: &str) -> Vec<ChatLine> {
        let mut rx = self.world.subscribe();
        let arrived = async { rx.wait_for(|id| id.is_some()).await.map(|id| id.clone()) };
        let world = match tokio::time::timeout(self.sync_wait, arrived).await {
            Ok(Ok(id)) => id,
            Ok(Err(_)) => None,
            Err(_) => {
                warn!("No world identifier received within {:?}", self.sync_wait);
                None
            }
        };
        self.render_objectives(player_uuid, world.as_deref())
    }

    /// The objectives section, empty when the week has no objectives. Without a
    /// world identifier nothing counts as done.
    pub fn render_objectives(&self, player_uuid: &str, world: Option<&str>) -> Vec<ChatLine> {
        let tasks = self.loader.load().tasks();
        if tasks.is_empty() {
            return Vec::new();
        }
        let mut lines = Vec::with_capacity(tasks.len() + 2);
        lines.push(ChatLine::objectives_header(tasks.len()));
        for objective in &tasks {
            let done = world.is_some_and(|w| {
                self.progress
                    .is_completed(player_uuid, w, &objective.kind, &objective.content)
            });
            lines.push(ChatLine::checklist(done, &objective.label()));
        }
        if world.is_none() {
            lines.push(ChatLine::colored(chat::STATUS_PENDING, Color::Gray).italic());
        }
        lines
    }
}
