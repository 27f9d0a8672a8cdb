//! # Weekly World - weekly challenge tracking for game servers
//!
//! Weekly World tracks, per player and per save world, which objectives of the
//! current weekly challenge have been completed under the challenge's restrictions,
//! and reports a finished week to the Weekly World API.
//!
//! ## Features
//!
//! - **Stable world identity**: progress is bound to a save folder, survives restarts,
//!   and is pruned when the folder is deleted.
//! - **Hot challenge file**: the weekly descriptor is re-read on every use.
//! - **Restrictions**: hardcore, game mode and difficulty checks, and operators are excluded.
//! - **Persistent progress**: locked, atomically replaced JSON files.
//! - **Remote reporting**: profile check on join and completion submission, with bounded
//!   retry on refused connections.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use weeklyworld::config::Paths;
//! use weeklyworld::WeeklyWorld;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = Arc::new(WeeklyWorld::new(
//!         Paths::new("config"),
//!         tokio::runtime::Handle::current(),
//!     )?);
//!     service.on_server_started();
//!     // host adapter: forward joins, events and ticks, call run_pending() each tick
//!     service.on_server_stopping();
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - file locations and the server environment
//! - [`challenge`] - descriptor loading, objectives, restrictions
//! - [`world_identity`] - world identifiers and the sync payload
//! - [`storage`] - progress store and atomic JSON persistence
//! - [`remote`] - HTTP client for the Weekly World API
//! - [`tracker`] - event matching and completion
//! - [`session`] - join flow and operator watch
//! - [`client`] - client-side objective display
//! - [`host`] - traits the host adapter implements
//!
//! ## Threading
//!
//! ```text
//! host main thread ──► WeeklyWorld ──► tracker / session ──► stores
//!        ▲                                   │
//!        │ run_pending()                     ▼
//!  MainThreadQueue ◄──────────── tokio tasks (HTTP, retries)
//! ```

pub mod challenge;
pub mod chat;
pub mod client;
pub mod config;
pub mod events;
pub mod host;
pub mod logutil;
pub mod metrics;
pub mod remote;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod storage;
pub mod tracker;
pub mod world_identity;

pub use service::WeeklyWorld;
