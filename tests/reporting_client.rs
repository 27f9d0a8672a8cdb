//! Reporting client against a local stub API: retries, classification, rendezvous.
mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use common::{fast_settings, refused_base, StubServer};
use weeklyworld::config::{EnvironmentConfig, ServerEnvironment};
use weeklyworld::remote::{
    ApiSettings, ProfileCheckResults, ProfileOutcome, ProfileStatus, ReportingClient, SubmitOutcome,
};

fn client_for(api_base: &str, settings: ApiSettings) -> (ReportingClient, watch::Sender<bool>) {
    let env = ServerEnvironment {
        api_base: Some(api_base.to_string()),
        server_secret: Some("s3cret".to_string()),
    };
    let (tx, rx) = watch::channel(false);
    let client = ReportingClient::new(
        Arc::new(EnvironmentConfig::preloaded(env)),
        Arc::new(ProfileCheckResults::new()),
        settings,
        tokio::runtime::Handle::current(),
        rx,
    )
    .unwrap();
    (client, tx)
}

#[tokio::test]
async fn refused_connections_are_retried_up_to_the_limit() {
    let (client, _tx) = client_for(&refused_base(), fast_settings());
    let started = Instant::now();

    let outcome = client.submit_completion("p1", 3).await;

    assert_eq!(outcome, SubmitOutcome::Unreachable);
    assert_eq!(client.attempts(), 3);
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn http_errors_are_not_retried() {
    let stub = StubServer::start(&[("/api/challenge/complete", 500)]).await;
    let (client, _tx) = client_for(&stub.base, fast_settings());

    assert_eq!(client.submit_completion("p1", 3).await, SubmitOutcome::Rejected(500));
    assert_eq!(client.attempts(), 1);
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn profile_statuses_map_to_rendezvous_entries() {
    let stub = StubServer::start(&[
        ("/api/profile/minecraft/missing", 404),
        ("/api/profile/minecraft/broken", 503),
    ])
    .await;
    let (client, _tx) = client_for(&stub.base, fast_settings());
    let results = client.results().clone();

    assert_eq!(client.check_profile("known").await, ProfileOutcome::Valid);
    assert_eq!(results.take_result("known"), None);

    assert_eq!(client.check_profile("missing").await, ProfileOutcome::NotFound);
    assert_eq!(results.take_result("missing"), Some(ProfileStatus::NotFound));

    assert_eq!(client.check_profile("broken").await, ProfileOutcome::ServerError(503));
    assert_eq!(results.take_result("broken"), Some(ProfileStatus::Error));
}

#[tokio::test]
async fn unreachable_profile_check_leaves_no_rendezvous() {
    let (client, _tx) = client_for(&refused_base(), fast_settings());

    let outcome = client.check_profile_async("p1".to_string()).await.unwrap();

    assert_eq!(outcome, ProfileOutcome::Unreachable);
    assert_eq!(client.attempts(), 3);
    assert_eq!(client.results().pending(), 0);
}

#[tokio::test]
async fn timeouts_give_up_without_retry() {
    let stub = StubServer::silent().await;
    let settings = ApiSettings {
        request_timeout: Duration::from_millis(300),
        ..fast_settings()
    };
    let (client, _tx) = client_for(&stub.base, settings);

    assert_eq!(client.check_profile("p1").await, ProfileOutcome::TimedOut);
    assert_eq!(client.attempts(), 1);
    assert_eq!(client.results().pending(), 0);
}

#[tokio::test]
async fn shutdown_interrupts_the_retry_pause() {
    let settings = ApiSettings {
        retry_delay: Duration::from_secs(30),
        ..fast_settings()
    };
    let (client, tx) = client_for(&refused_base(), settings);
    let started = Instant::now();

    let pending = client.submit_completion_async("p1".to_string(), 1);
    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.send_replace(true);

    assert_eq!(pending.await.unwrap(), SubmitOutcome::Failed);
    assert_eq!(client.attempts(), 1);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn trailing_slash_and_uuid_are_normalised_into_the_path() {
    let stub = StubServer::start(&[]).await;
    let (client, _tx) = client_for(&format!("{}/", stub.base), fast_settings());

    client.check_profile("a b").await;

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/profile/minecraft/a%20b");
}

#[tokio::test]
async fn missing_secret_skips_requests() {
    let stub = StubServer::start(&[]).await;
    let env = ServerEnvironment {
        api_base: Some(stub.base.clone()),
        server_secret: None,
    };
    let (_tx, rx) = watch::channel(false);
    let client = ReportingClient::new(
        Arc::new(EnvironmentConfig::preloaded(env)),
        Arc::new(ProfileCheckResults::new()),
        fast_settings(),
        tokio::runtime::Handle::current(),
        rx,
    )
    .unwrap();

    assert_eq!(client.check_profile("p1").await, ProfileOutcome::Skipped);
    assert_eq!(client.submit_completion("p1", 1).await, SubmitOutcome::Skipped);
    assert!(stub.requests().is_empty());
}
