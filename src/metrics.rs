//! Process-wide counters for the reporting client.
use std::sync::atomic::{AtomicU64, Ordering};

static HTTP_ATTEMPTS: AtomicU64 = AtomicU64::new(0);
static HTTP_RETRIES: AtomicU64 = AtomicU64::new(0);
static PROFILE_VALID: AtomicU64 = AtomicU64::new(0);
static PROFILE_NOT_FOUND: AtomicU64 = AtomicU64::new(0);
static PROFILE_ERROR: AtomicU64 = AtomicU64::new(0);
static PROFILE_UNREACHABLE: AtomicU64 = AtomicU64::new(0);
static COMPLETIONS_ACCEPTED: AtomicU64 = AtomicU64::new(0);
static COMPLETIONS_FAILED: AtomicU64 = AtomicU64::new(0);

pub fn inc_http_attempts() {
    HTTP_ATTEMPTS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_http_retries() {
    HTTP_RETRIES.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_profile_valid() {
    PROFILE_VALID.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_profile_not_found() {
    PROFILE_NOT_FOUND.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_profile_error() {
    PROFILE_ERROR.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_profile_unreachable() {
    PROFILE_UNREACHABLE.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_completions_accepted() {
    COMPLETIONS_ACCEPTED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_completions_failed() {
    COMPLETIONS_FAILED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub http_attempts: u64,
    pub http_retries: u64,
    pub profile_valid: u64,
    pub profile_not_found: u64,
    pub profile_error: u64,
    pub profile_unreachable: u64,
    pub completions_accepted: u64,
    pub completions_failed: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        http_attempts: HTTP_ATTEMPTS.load(Ordering::Relaxed),
        http_retries: HTTP_RETRIES.load(Ordering::Relaxed),
        profile_valid: PROFILE_VALID.load(Ordering::Relaxed),
        profile_not_found: PROFILE_NOT_FOUND.load(Ordering::Relaxed),
        profile_error: PROFILE_ERROR.load(Ordering::Relaxed),
        profile_unreachable: PROFILE_UNREACHABLE.load(Ordering::Relaxed),
        completions_accepted: COMPLETIONS_ACCEPTED.load(Ordering::Relaxed),
        completions_failed: COMPLETIONS_FAILED.load(Ordering::Relaxed),
    }
}
