//! Server liveness tracking.
//!
//! A health check is a `GET /health`; any non-2xx response or transport
//! failure counts as a miss. Checks run on the fixed poll interval with no
//! backoff. Connectivity only flips to [`Connectivity::OfflineConfirmed`]
//! after [`OFFLINE_THRESHOLD`] consecutive misses, so a single dropped
//! request never blanks the dashboard.

use tracing::{debug, info};

use crate::api::ApiClient;
use crate::store::{StateStore, StateUpdate};

/// Consecutive failed checks before the server is considered offline.
pub const OFFLINE_THRESHOLD: u32 = 3;

/// Connectivity as derived from consecutive health-check outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// No check has completed yet.
    Connecting,
    /// Last check succeeded.
    Online,
    /// Failing, but below the offline threshold.
    OfflineSuspected,
    /// At or past the offline threshold.
    OfflineConfirmed,
}

impl Connectivity {
    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::Connecting => "connecting",
            Connectivity::Online => "online",
            Connectivity::OfflineSuspected => "unstable",
            Connectivity::OfflineConfirmed => "offline",
        }
    }
}

/// Tracks consecutive health-check failures and the derived connectivity
/// state.
#[derive(Debug)]
pub struct HealthMonitor {
    state: Connectivity,
    failures: u32,
    guidance_shown: bool,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self {
            state: Connectivity::Connecting,
            failures: 0,
            guidance_shown: false,
        }
    }

    /// Current connectivity state.
    pub fn connectivity(&self) -> Connectivity {
        self.state
    }

    /// Consecutive failed checks.
    pub fn failure_count(&self) -> u32 {
        self.failures
    }

    /// Whether the offline threshold has been reached. Rendering switches
    /// to "unavailable" placeholders past this point instead of showing
    /// possibly-stale data as live.
    pub fn is_offline_confirmed(&self) -> bool {
        self.state == Connectivity::OfflineConfirmed
    }

    /// Record a successful check.
    pub fn record_success(&mut self) {
        if self.state != Connectivity::Online {
            info!("server reachable");
        }
        self.failures = 0;
        self.state = Connectivity::Online;
        self.guidance_shown = false;
    }

    /// Record a failed check.
    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
        self.state = if self.failures >= OFFLINE_THRESHOLD {
            Connectivity::OfflineConfirmed
        } else {
            Connectivity::OfflineSuspected
        };
        debug!(failures = self.failures, state = self.state.label(), "health check missed");
    }

    /// Returns `true` exactly once per offline-confirmed episode, so the
    /// "start the server" guidance fires a single time. Re-checking while
    /// still confirmed only updates status text.
    pub fn take_offline_guidance(&mut self) -> bool {
        if self.state == Connectivity::OfflineConfirmed && !self.guidance_shown {
            self.guidance_shown = true;
            true
        } else {
            false
        }
    }

    /// Run one health check and publish the outcome to the store.
    /// Returns whether the server responded.
    pub async fn check(&mut self, api: &ApiClient, store: &StateStore) -> bool {
        let online = api.get("/health").await.is_ok();
        if online {
            self.record_success();
        } else {
            self.record_failure();
        }
        store.set(StateUpdate {
            server_online: Some(online),
            health_failure_count: Some(self.failures),
            ..Default::default()
        });
        online
    }
}
