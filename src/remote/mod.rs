//! # Remote reporting client
//!
//! Talks to the Weekly World API:
//!
//! - `GET  {api_base}/api/profile/minecraft/{uuid}` on join (200 valid, 404 unregistered)
//! - `POST {api_base}/api/challenge/complete` when a player finishes the week
//!
//! Both requests carry `X-Server-Key` and the `WeeklyWorldChallenge/1.0` user agent
//! and time out after 30 s. A request that cannot connect is retried up to
//! [`MAX_RETRIES`] attempts in total with a fixed [`RETRY_DELAY_MS`] pause; every
//! other failure ends the chain immediately.
//!
//! All network work runs on the tokio runtime handed to the client. Results reach
//! game code only through [`ProfileCheckResults`] and the main-thread queue.

pub mod error;
pub mod profile_check;

use chrono::Utc;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::EnvironmentConfig;
use crate::metrics;

pub use error::{ApiError, Result};
pub use profile_check::{ProfileCheckResults, ProfileStatus};

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY_MS: u64 = 1000;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
pub const USER_AGENT: &str = "WeeklyWorldChallenge/1.0";
pub const SERVER_KEY_HEADER: &str = "X-Server-Key";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Total attempts per request, including the first.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOutcome {
    Valid,
    NotFound,
    ServerError(u16),
    /// Every attempt failed to connect.
    Unreachable,
    TimedOut,
    Failed,
    /// The server environment is not configured.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(u16),
    Rejected(u16),
    Unreachable,
    TimedOut,
    Failed,
    Skipped,
}

#[derive(Debug, Serialize)]
struct CompletionPayload<'a> {
    week: u32,
    #[serde(rename = "playerUUID")]
    player_uuid: &'a str,
    timestamp: i64,
}

#[derive(Clone)]
pub struct ReportingClient {
    http: reqwest::Client,
    env: Arc<EnvironmentConfig>,
    results: Arc<ProfileCheckResults>,
    settings: ApiSettings,
    runtime: Handle,
    shutdown: watch::Receiver<bool>,
    attempts: Arc<AtomicU64>,
}

impl ReportingClient {
    pub fn new(
        env: Arc<EnvironmentConfig>,
        results: Arc<ProfileCheckResults>,
        settings: ApiSettings,
        runtime: Handle,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .no_proxy()
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            env,
            results,
            settings,
            runtime,
            shutdown,
            attempts: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    pub fn results(&self) -> &Arc<ProfileCheckResults> {
        &self.results
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Network attempts made by this client so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Send the request built by `build`, retrying only when the connection could not
    /// be opened.
    async fn execute_with_retry<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            debug!("HTTP request attempt {} of {}", attempt, self.settings.max_retries);
            self.attempts.fetch_add(1, Ordering::Relaxed);
            metrics::inc_http_attempts();
            match build().send().await {
                Ok(resp) => {
                    debug!("HTTP response received: status {}", resp.status());
                    return Ok(resp);
                }
                Err(e) => {
                    let err = ApiError::from_reqwest(e, self.settings.request_timeout);
                    debug!("HTTP request attempt {} failed: {}", attempt, err);
                    if attempt < self.settings.max_retries && err.is_connection_refused() {
                        metrics::inc_http_retries();
                        self.pause_before_retry().await?;
                        attempt += 1;
                    } else {
                        return Err(err);
                    }
                }
            }
        }
    }

    async fn pause_before_retry(&self) -> Result<()> {
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = tokio::time::sleep(self.settings.retry_delay) => Ok(()),
            _ = wait_for_shutdown(&mut shutdown) => Err(ApiError::Cancelled),
        }
    }

    /// Check that the player has a Weekly World profile.
    ///
    /// 404 records [`ProfileStatus::NotFound`], any other non-200 status records
    /// [`ProfileStatus::Error`]; network failures record nothing.
    pub async fn check_profile(&self, player_uuid: &str) -> ProfileOutcome {
        let env = self.env.get();
        let (Some(api_base), Some(secret)) = (env.api_base(), env.server_secret()) else {
            debug!("Server environment not configured, skipping profile check");
            return ProfileOutcome::Skipped;
        };
        let url = format!(
            "{}/api/profile/minecraft/{}",
            api_base,
            urlencoding::encode(player_uuid)
        );
        debug!("Checking player profile: {} for player {}", url, player_uuid);

        let result = self
            .execute_with_retry(|| self.http.get(&url).header(SERVER_KEY_HEADER, secret))
            .await;

        match result {
            Ok(resp) => match resp.status().as_u16() {
                200 => {
                    debug!("Player {} has a valid profile", player_uuid);
                    metrics::inc_profile_valid();
                    ProfileOutcome::Valid
                }
                404 => {
                    info!("Player {} does not have a profile - sending registration message", player_uuid);
                    metrics::inc_profile_not_found();
                    self.results.set_result(player_uuid, ProfileStatus::NotFound);
                    ProfileOutcome::NotFound
                }
                status => {
                    let body = resp.text().await.unwrap_or_default();
                    warn!("Profile check failed for player {}: HTTP {} - {}", player_uuid, status, body);
                    metrics::inc_profile_error();
                    self.results.set_result(player_uuid, ProfileStatus::Error);
                    ProfileOutcome::ServerError(status)
                }
            },
            Err(ApiError::ConnectionRefused(_)) => {
                warn!(
                    "Could not connect to API server for profile check after {} attempts - server may be offline or firewall blocking connection: {}",
                    self.settings.max_retries, api_base
                );
                warn!("Note: Some firewalls only allow connections from high port numbers (>45000). Consider checking firewall configuration.");
                metrics::inc_profile_unreachable();
                ProfileOutcome::Unreachable
            }
            Err(ApiError::Timeout(_)) => {
                warn!("Profile check API request timed out for player {}", player_uuid);
                ProfileOutcome::TimedOut
            }
            Err(e) => {
                error!("Failed to check player profile for player {}: {}", player_uuid, e);
                ProfileOutcome::Failed
            }
        }
    }

    /// Run [`Self::check_profile`] on the runtime.
    pub fn check_profile_async(&self, player_uuid: String) -> JoinHandle<ProfileOutcome> {
        let client = self.clone();
        self.runtime
            .spawn(async move { client.check_profile(&player_uuid).await })
    }

    /// Report that the player completed every objective of `week`.
    pub async fn submit_completion(&self, player_uuid: &str, week: u32) -> SubmitOutcome {
        let env = self.env.get();
        let (Some(api_base), Some(secret)) = (env.api_base(), env.server_secret()) else {
            warn!("Server environment not configured, skipping completion submission");
            return SubmitOutcome::Skipped;
        };
        let url = format!("{}/api/challenge/complete", api_base);
        let payload = CompletionPayload {
            week,
            player_uuid,
            timestamp: Utc::now().timestamp_millis(),
        };
        debug!("Sending completion to API: {} for player {} week {}", url, player_uuid, week);

        let result = self
            .execute_with_retry(|| {
                self.http
                    .post(&url)
                    .header(SERVER_KEY_HEADER, secret)
                    .json(&payload)
            })
            .await;

        match result {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    info!("Successfully sent completion for player {} week {}", player_uuid, week);
                    metrics::inc_completions_accepted();
                    SubmitOutcome::Accepted(status.as_u16())
                } else {
                    let body = resp.text().await.unwrap_or_default();
                    error!(
                        "Failed to send completion for player {} week {}: HTTP {} - {}",
                        player_uuid,
                        week,
                        status.as_u16(),
                        body
                    );
                    metrics::inc_completions_failed();
                    SubmitOutcome::Rejected(status.as_u16())
                }
            }
            Err(ApiError::ConnectionRefused(_)) => {
                warn!(
                    "Could not connect to API server for player {} week {} - server may be offline: {}",
                    player_uuid, week, api_base
                );
                metrics::inc_completions_failed();
                SubmitOutcome::Unreachable
            }
            Err(ApiError::Timeout(_)) => {
                warn!("API request timed out for player {} week {}", player_uuid, week);
                metrics::inc_completions_failed();
                SubmitOutcome::TimedOut
            }
            Err(e) => {
                error!("Failed to send completion to server for player {} week {}: {}", player_uuid, week, e);
                metrics::inc_completions_failed();
                SubmitOutcome::Failed
            }
        }
    }

    /// Run [`Self::submit_completion`] on the runtime.
    pub fn submit_completion_async(&self, player_uuid: String, week: u32) -> JoinHandle<SubmitOutcome> {
        let client = self.clone();
        self.runtime
            .spawn(async move { client.submit_completion(&player_uuid, week).await })
    }
}

/// Resolves once shutdown is signalled; never resolves if the sender is gone.
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_service_contract() {
        let s = ApiSettings::default();
        assert_eq!(s.max_retries, 3);
        assert_eq!(s.retry_delay, Duration::from_millis(1000));
        assert_eq!(s.request_timeout, Duration::from_secs(30));
        assert_eq!(s.user_agent, "WeeklyWorldChallenge/1.0");
    }

    #[test]
    fn completion_body_field_names() {
        let body = serde_json::to_value(CompletionPayload {
            week: 1,
            player_uuid: "p1",
            timestamp: 42,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"week": 1, "playerUUID": "p1", "timestamp": 42}));
    }

    #[tokio::test]
    async fn unconfigured_environment_skips_network() {
        let (_tx, rx) = watch::channel(false);
        let client = ReportingClient::new(
            Arc::new(EnvironmentConfig::preloaded(Default::default())),
            Arc::new(ProfileCheckResults::new()),
            ApiSettings::default(),
            Handle::current(),
            rx,
        )
        .unwrap();
        assert_eq!(client.check_profile("p1").await, ProfileOutcome::Skipped);
        assert_eq!(client.submit_completion("p1", 1).await, SubmitOutcome::Skipped);
        assert_eq!(client.attempts(), 0);
    }
}
