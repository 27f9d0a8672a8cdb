//! The service root a host adapter holds for the lifetime of the server.

use anyhow::Context;
use log::info;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::challenge::restrictions;
use crate::challenge::ChallengeLoader;
use crate::config::{EnvironmentConfig, Paths};
use crate::events::GameEvent;
use crate::host::PlayerHandle;
use crate::remote::{ApiSettings, ProfileCheckResults, ProfileOutcome, ReportingClient};
use crate::scheduler::MainThreadQueue;
use crate::session::{OperatorWatch, SessionOrchestrator};
use crate::storage::PlayerProgressStore;
use crate::tracker::{ChallengeTracker, EventOutcome};
use crate::world_identity::WorldIdentityService;

pub struct WeeklyWorld {
    paths: Paths,
    env: Arc<EnvironmentConfig>,
    loader: ChallengeLoader,
    identities: Arc<WorldIdentityService>,
    progress: Arc<PlayerProgressStore>,
    client: ReportingClient,
    tracker: ChallengeTracker,
    sessions: SessionOrchestrator,
    operators: OperatorWatch,
    queue: MainThreadQueue,
    shutdown: watch::Sender<bool>,
}

impl WeeklyWorld {
    pub fn new(paths: Paths, runtime: Handle) -> anyhow::Result<Self> {
        Self::with_api_settings(paths, runtime, ApiSettings::default())
    }

    pub fn with_api_settings(paths: Paths, runtime: Handle, settings: ApiSettings) -> anyhow::Result<Self> {
        let env = Arc::new(EnvironmentConfig::new(paths.server_env_file()));
        let loader = ChallengeLoader::new(paths.objectives_file());
        let identities = Arc::new(WorldIdentityService::open(&paths));
        let progress = Arc::new(PlayerProgressStore::new(paths.player_data_file()));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let client = ReportingClient::new(
            env.clone(),
            Arc::new(ProfileCheckResults::new()),
            settings,
            runtime,
            shutdown_rx,
        )
        .context("creating reporting client")?;
        let queue = MainThreadQueue::new();

        let tracker = ChallengeTracker::new(loader.clone(), identities.clone(), progress.clone(), client.clone());
        let sessions = SessionOrchestrator::new(
            loader.clone(),
            identities.clone(),
            progress.clone(),
            client.clone(),
            queue.handle(),
        );

        Ok(Self {
            paths,
            env,
            loader,
            identities,
            progress,
            client,
            tracker,
            sessions,
            operators: OperatorWatch::new(),
            queue,
            shutdown,
        })
    }

    /// Prune world identifiers and progress for worlds no longer in the saves
    /// directory. Progress is only pruned when the saves directory could be listed.
    pub fn on_server_started(&self) {
        info!("Weekly World starting (config dir {})", self.paths.config_dir.display());
        match self.identities.cleanup_deleted_worlds() {
            Some(existing) => {
                let removed = self.progress.cleanup_deleted_worlds(&existing);
                info!("Deleted-world sweep finished ({} progress entries removed)", removed);
            }
            None => info!("Skipping deleted-world sweep; saves directory unavailable"),
        }
    }

    /// Flush both stores and stop any pending retries.
    pub fn on_server_stopping(&self) {
        info!("Weekly World stopping; saving state");
        self.identities.save_all();
        self.progress.save();
        self.shutdown();
    }

    /// Send the world identifier to the player and start the join flow.
    pub fn on_player_join(&self, player: Arc<dyn PlayerHandle>) -> JoinHandle<ProfileOutcome> {
        self.identities.sync(player.as_ref());
        self.sessions.on_player_join(player)
    }

    pub fn on_player_leave(&self, player_uuid: &str) {
        self.operators.forget(player_uuid);
        self.client.results().clear_result(player_uuid);
    }

    /// Per-tick check for operator status changes.
    pub fn on_tick(&self, player: &dyn PlayerHandle) -> Option<bool> {
        self.operators.tick(player)
    }

    pub fn report_event(&self, player: &dyn PlayerHandle, kind: &str, value: &str) -> EventOutcome {
        self.tracker.report_event(player, kind, value)
    }

    /// Whether the player could complete an objective right now.
    pub fn can_complete(&self, player: &dyn PlayerHandle) -> bool {
        restrictions::can_complete(player, &self.loader.load())
    }

    pub fn handle_event(&self, player: &dyn PlayerHandle, event: &GameEvent) -> EventOutcome {
        match event.as_report() {
            Some((kind, value)) => self.tracker.report_event(player, kind.as_str(), value),
            None => EventOutcome::Unmatched,
        }
    }

    /// Run queued main-thread work. Call from the host's main thread.
    pub fn run_pending(&self) -> usize {
        self.queue.run_pending()
    }

    /// Signal in-flight requests to stop retrying.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn environment(&self) -> &EnvironmentConfig {
        &self.env
    }

    pub fn loader(&self) -> &ChallengeLoader {
        &self.loader
    }

    pub fn identities(&self) -> &WorldIdentityService {
        &self.identities
    }

    pub fn progress(&self) -> &PlayerProgressStore {
        &self.progress
    }

    pub fn client(&self) -> &ReportingClient {
        &self.client
    }
}
