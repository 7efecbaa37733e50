//! Application state and control logic.
//!
//! [`App`] owns the injected components (store, client, health monitor,
//! graph loader, poller) and exposes the operations the event loop drives:
//! periodic refresh, manual retry, tab activation with diagram loading,
//! polling control, cache clearing, and one-shot export. Display state is
//! always re-derived from the latest snapshot; the only per-tab state kept
//! here is presentation bookkeeping ([`DiagramView`]).

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

use crate::api::ApiClient;
use crate::graph::{self, Diagram, GraphLoader};
use crate::health::HealthMonitor;
use crate::poll::Poller;
use crate::status;
use crate::store::{StateStore, StateUpdate};
use crate::ui::Theme;

/// The current tab: the status dashboard or one diagram per tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Orchestration,
    Skills,
    Swarms,
    Personas,
    Recipes,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Dashboard,
        Tab::Orchestration,
        Tab::Skills,
        Tab::Swarms,
        Tab::Personas,
        Tab::Recipes,
    ];

    /// Cycle to the next tab.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Cycle to the previous tab.
    pub fn prev(self) -> Self {
        let index = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Returns the display label for this tab.
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Orchestration => "Orchestration",
            Tab::Skills => "Skills",
            Tab::Swarms => "Swarms",
            Tab::Personas => "Personas",
            Tab::Recipes => "Recipes",
        }
    }

    /// Stable name used for persistence.
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Orchestration => "orchestration",
            Tab::Skills => "skills",
            Tab::Swarms => "swarms",
            Tab::Personas => "personas",
            Tab::Recipes => "recipes",
        }
    }

    /// Parse a persisted name. Unknown values are rejected so a stale or
    /// corrupt state file falls back to the dashboard.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// The diagram shown on this tab, if it is a diagram tab.
    pub fn diagram(&self) -> Option<Diagram> {
        match self {
            Tab::Dashboard => None,
            Tab::Orchestration => Some(Diagram::Orchestration),
            Tab::Skills => Some(Diagram::Skills),
            Tab::Swarms => Some(Diagram::Swarms),
            Tab::Personas => Some(Diagram::Personas),
            Tab::Recipes => Some(Diagram::Recipes),
        }
    }
}

/// Presentation state for one diagram tab.
#[derive(Debug, Clone, Default)]
pub struct DiagramView {
    /// A load is in flight.
    pub loading: bool,
    /// Shown content came from the persistent fallback cache.
    pub stale: bool,
    /// Why the diagram cannot be shown, if it cannot.
    pub error: Option<String>,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    pub store: StateStore,
    pub api: ApiClient,
    pub health: HealthMonitor,
    pub poller: Poller,
    graphs: GraphLoader,

    /// Per-diagram presentation bookkeeping.
    pub views: HashMap<Diagram, DiagramView>,

    pub theme: Theme,
    state_file: Option<PathBuf>,

    // Status message (temporary feedback)
    status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app with injected components. Restores the persisted
    /// last-active tab when a state file is given.
    pub fn new(
        api: ApiClient,
        graphs: GraphLoader,
        poll_interval: Duration,
        state_file: Option<PathBuf>,
    ) -> Self {
        let store = StateStore::new();
        if let Some(tab) = state_file.as_deref().and_then(restore_tab) {
            store.set(StateUpdate {
                active_tab: Some(tab),
                ..Default::default()
            });
        }

        Self {
            running: true,
            show_help: false,
            store,
            api,
            health: HealthMonitor::new(),
            poller: Poller::new(poll_interval),
            graphs,
            views: HashMap::new(),
            theme: Theme::auto_detect(),
            state_file,
            status_message: None,
        }
    }

    /// The tab currently shown.
    pub fn active_tab(&self) -> Tab {
        self.store.get().active_tab
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (5 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((message, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(5) {
                return Some(message);
            }
        }
        None
    }

    /// Run one health check and the full status fan-out concurrently.
    pub async fn refresh(&mut self) {
        let Self {
            api, store, health, ..
        } = self;
        tokio::join!(health.check(api, store), status::fetch_status(api, store));

        if self.health.take_offline_guidance() {
            self.set_status_message(
                "Server offline. Start the Stillwater admin server, then press 'r' to retry."
                    .to_string(),
            );
        }
    }

    /// Drive periodic refresh. Called once per event-loop iteration.
    pub async fn tick(&mut self) {
        if self.poller.should_poll(Instant::now()) {
            self.refresh().await;
        }
    }

    /// Manual refresh, available regardless of connectivity state.
    pub async fn retry(&mut self) {
        self.set_status_message("Retrying...".to_string());
        self.refresh().await;
    }

    /// Start polling and publish the flag.
    pub fn start_polling(&mut self) {
        if self.poller.start() {
            self.publish_polling_state();
        }
    }

    /// Toggle polling explicitly (distinct from focus-driven pausing).
    pub fn toggle_polling(&mut self) {
        if self.poller.is_polling() {
            self.poller.stop();
            self.set_status_message("Polling stopped".to_string());
        } else {
            self.poller.start();
            self.set_status_message("Polling started".to_string());
        }
        self.publish_polling_state();
    }

    /// Record a terminal focus change.
    pub fn set_backgrounded(&mut self, backgrounded: bool) {
        self.poller.set_backgrounded(backgrounded);
        self.publish_polling_state();
    }

    fn publish_polling_state(&self) {
        let is_polling = self.poller.is_polling();
        if self.store.get().is_polling != is_polling {
            self.store.set(StateUpdate {
                is_polling: Some(is_polling),
                ..Default::default()
            });
        }
    }

    /// Switch to a tab, persist the choice, and load its diagram if it has
    /// one.
    pub async fn activate_tab(&mut self, tab: Tab) {
        self.store.set(StateUpdate {
            active_tab: Some(tab),
            ..Default::default()
        });
        if let Some(path) = &self.state_file {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Err(e) = fs::write(path, tab.name()) {
                warn!(path = %path.display(), error = %e, "cannot persist active tab");
            }
        }
        if let Some(diagram) = tab.diagram() {
            self.load_diagram(diagram).await;
        }
    }

    /// Switch to the next tab.
    pub async fn next_tab(&mut self) {
        self.activate_tab(self.active_tab().next()).await;
    }

    /// Switch to the previous tab.
    pub async fn prev_tab(&mut self) {
        self.activate_tab(self.active_tab().prev()).await;
    }

    /// Load one diagram and record the outcome for rendering.
    async fn load_diagram(&mut self, diagram: Diagram) {
        self.views.entry(diagram).or_default().loading = true;

        let Self {
            graphs, api, store, ..
        } = self;
        let result = graphs.load(api, diagram, store).await;

        let view = self.views.entry(diagram).or_default();
        view.loading = false;
        match result {
            Ok(loaded) => {
                view.stale = loaded.stale;
                view.error = graph::check_syntax(&loaded.source)
                    .err()
                    .map(|e| e.to_string());
            }
            Err(e) => {
                view.error = Some(e.to_string());
            }
        }
        if let Some(error) = self.views.get(&diagram).and_then(|v| v.error.clone()) {
            self.set_status_message(error);
        }
    }

    /// Drop all session-cached diagram source and reload the visible
    /// diagram, if any.
    pub async fn clear_diagram_cache(&mut self) {
        self.store.set(StateUpdate {
            clear_graph_cache: true,
            ..Default::default()
        });
        self.views.clear();
        self.set_status_message("Diagram cache cleared".to_string());
        if let Some(diagram) = self.active_tab().diagram() {
            self.load_diagram(diagram).await;
        }
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current status snapshot to a JSON file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        let snapshot = self.store.get();

        let mut export = serde_json::Map::new();
        export.insert(
            "connectivity".to_string(),
            serde_json::json!(self.health.connectivity().label()),
        );
        export.insert(
            "server_online".to_string(),
            serde_json::json!(snapshot.server_online),
        );
        export.insert(
            "health_failure_count".to_string(),
            serde_json::json!(snapshot.health_failure_count),
        );

        let mut resources = serde_json::Map::new();
        resources.insert("llm".to_string(), snapshot.llm.clone().into());
        resources.insert("solace".to_string(), snapshot.solace.clone().into());
        resources.insert("skills".to_string(), snapshot.skills.clone().into());
        resources.insert("swarms".to_string(), snapshot.swarms.clone().into());
        resources.insert("personas".to_string(), snapshot.personas.clone().into());
        export.insert(
            "resources".to_string(),
            serde_json::Value::Object(resources),
        );

        let cached: Vec<&str> = Diagram::ALL
            .iter()
            .filter(|d| snapshot.graph_cache.contains_key(d))
            .map(|d| d.name())
            .collect();
        export.insert("cached_diagrams".to_string(), serde_json::json!(cached));

        let json = serde_json::to_string_pretty(&serde_json::Value::Object(export))?;
        fs::write(path, json)?;
        Ok(())
    }
}

fn restore_tab(path: &std::path::Path) -> Option<Tab> {
    let name = fs::read_to_string(path).ok()?;
    Tab::from_name(name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MemoryDiagramCache, OfflineProxy};
    use crate::testsupport::{CannedResponse, TestServer};
    use serde_json::json;
    use std::collections::HashMap;

    fn app_for(base_url: &str, state_file: Option<PathBuf>) -> App {
        App::new(
            ApiClient::new(base_url),
            GraphLoader::new(OfflineProxy::new(Box::new(MemoryDiagramCache::default()))),
            Duration::from_secs(5),
            state_file,
        )
    }

    #[test]
    fn test_tab_cycling_and_names() {
        assert_eq!(Tab::Dashboard.next(), Tab::Orchestration);
        assert_eq!(Tab::Recipes.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.prev(), Tab::Recipes);
        for tab in Tab::ALL {
            assert_eq!(Tab::from_name(tab.name()), Some(tab));
        }
        assert_eq!(Tab::from_name("unknown"), None);
        assert_eq!(Tab::Skills.diagram(), Some(Diagram::Skills));
        assert_eq!(Tab::Dashboard.diagram(), None);
    }

    #[tokio::test]
    async fn test_activate_tab_persists_and_restores() {
        let dir = tempfile::tempdir().unwrap();
        let state_file = dir.path().join("active-tab");

        let mut routes = HashMap::new();
        routes.insert(
            "/api/mermaid/swarms".to_string(),
            CannedResponse::json(200, json!({"graph_syntax": "graph TD\n  a --> b"})),
        );
        let server = TestServer::start(routes).await;

        let mut app = app_for(&server.base_url, Some(state_file.clone()));
        app.activate_tab(Tab::Swarms).await;
        assert_eq!(app.active_tab(), Tab::Swarms);
        assert_eq!(fs::read_to_string(&state_file).unwrap(), "swarms");

        // A new app restores the persisted tab.
        let restored = app_for(&server.base_url, Some(state_file.clone()));
        assert_eq!(restored.active_tab(), Tab::Swarms);

        // A corrupt state file falls back to the dashboard.
        fs::write(&state_file, "nonsense").unwrap();
        let fallback = app_for(&server.base_url, Some(state_file));
        assert_eq!(fallback.active_tab(), Tab::Dashboard);
    }

    #[tokio::test]
    async fn test_diagram_tab_records_view_state() {
        let mut routes = HashMap::new();
        routes.insert(
            "/api/mermaid/skills".to_string(),
            CannedResponse::json(200, json!({"graph_syntax": "graph TD\n  a --> b"})),
        );
        let server = TestServer::start(routes).await;

        let mut app = app_for(&server.base_url, None);
        app.activate_tab(Tab::Skills).await;

        let view = app.views.get(&Diagram::Skills).unwrap();
        assert!(!view.loading);
        assert!(!view.stale);
        assert!(view.error.is_none());
        assert!(app.store.get().graph_cache.contains_key(&Diagram::Skills));
    }

    #[tokio::test]
    async fn test_syntax_error_reported_distinctly() {
        let mut routes = HashMap::new();
        routes.insert(
            "/api/mermaid/recipes".to_string(),
            CannedResponse::json(200, json!({"graph_syntax": "<oops>"})),
        );
        let server = TestServer::start(routes).await;

        let mut app = app_for(&server.base_url, None);
        app.activate_tab(Tab::Recipes).await;

        let view = app.views.get(&Diagram::Recipes).unwrap();
        let error = view.error.as_deref().unwrap();
        assert!(error.starts_with("diagram syntax error"), "got: {error}");
    }

    #[tokio::test]
    async fn test_fetch_error_reported_as_load_failure() {
        let mut app = app_for("http://127.0.0.1:1", None);
        app.activate_tab(Tab::Personas).await;

        let view = app.views.get(&Diagram::Personas).unwrap();
        let error = view.error.as_deref().unwrap();
        assert!(error.starts_with("failed to load diagram"), "got: {error}");
    }

    #[tokio::test]
    async fn test_refresh_surfaces_offline_guidance_once() {
        let mut app = app_for("http://127.0.0.1:1", None);
        for _ in 0..3 {
            app.refresh().await;
        }
        assert!(app.health.is_offline_confirmed());
        assert!(app.get_status_message().unwrap().contains("Server offline"));

        // Further checks while confirmed only update counters, not the
        // guidance message.
        app.status_message = None;
        app.refresh().await;
        assert!(app.get_status_message().is_none());
    }

    #[tokio::test]
    async fn test_polling_flag_published_to_store() {
        let mut app = app_for("http://127.0.0.1:1", None);
        assert!(!app.store.get().is_polling);

        app.start_polling();
        assert!(app.store.get().is_polling);

        app.toggle_polling();
        assert!(!app.store.get().is_polling);
    }

    #[tokio::test]
    async fn test_export_state() {
        let server = TestServer::start(HashMap::new()).await;
        let mut app = app_for(&server.base_url, None);
        app.refresh().await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        app.export_state(&path).unwrap();

        let exported: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(exported["resources"]["llm"], json!({"online": false}));
        assert!(exported["connectivity"].is_string());
    }
}
