//! # stillwater-doctor
//!
//! A terminal console and library for monitoring a local Stillwater admin
//! server.
//!
//! The doctor polls the server's status endpoints, tracks connectivity
//! with a tolerant health state machine, and renders a dashboard plus the
//! server's Mermaid diagrams in an interactive TUI. Diagrams are cached
//! both per session and persistently, so the console stays useful while
//! the server is down.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌─────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  poll   │───▶│ status  │───▶│  store  │───▶│    ui    │  │
//! │  │ health  │    │ (fan-out)    │(snapshots)   │(rendering)  │
//! │  └────┬────┘    └────┬────┘    └─────────┘    └──────────┘  │
//! │       │              │              ▲                        │
//! │       ▼              ▼              │                        │
//! │  ┌─────────┐    ┌─────────┐   ┌─────────┐                   │
//! │  │   api   │◀───│  graph  │──▶│ caches  │ session + file    │
//! │  │ (HTTP)  │    │ (loader)│   └─────────┘                   │
//! │  └─────────┘    └─────────┘                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`api`]**: HTTP client with a fixed timeout and normalized
//!   [`NetworkError`] failures
//! - **[`store`]**: Immutable-snapshot state store; every component reads
//!   and writes application state through it
//! - **[`health`]**: Consecutive-failure connectivity tracking with an
//!   offline-confirmation threshold
//! - **[`status`]**: Guarded fan-out over the five status endpoints,
//!   committed to the store as one update
//! - **[`graph`]**: Diagram loading with a session cache and a persistent
//!   offline fallback
//! - **[`poll`]**: Periodic refresh scheduling, aware of terminal focus
//! - **[`app`]**/**[`events`]**/**[`ui`]**: TUI state, key handling, and
//!   ratatui rendering
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a local admin server
//! stillwater-doctor --url http://127.0.0.1:8000
//!
//! # Fetch status once and write it to a file
//! stillwater-doctor --export status.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use stillwater_doctor::{ApiClient, HealthMonitor, StateStore};
//!
//! # tokio_test::block_on(async {
//! let api = ApiClient::new("http://127.0.0.1:8000");
//! let store = StateStore::new();
//! let mut health = HealthMonitor::new();
//!
//! if health.check(&api, &store).await {
//!     let snapshot = stillwater_doctor::status::fetch_status(&api, &store).await;
//!     println!("llm: {:?}", snapshot.llm);
//! }
//! # });
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod events;
pub mod graph;
pub mod health;
pub mod poll;
pub mod status;
pub mod store;
pub mod ui;

#[cfg(test)]
pub(crate) mod testsupport;

// Re-export main types for convenience
pub use api::{ApiClient, NetworkError};
pub use app::{App, Tab};
pub use graph::{Diagram, DiagramCache, FileDiagramCache, GraphLoader, OfflineProxy};
pub use health::{Connectivity, HealthMonitor};
pub use poll::Poller;
pub use store::{Snapshot, StateStore, StateUpdate};
