//! Diagram fetching and caching.
//!
//! Two cooperating caches sit between a diagram tab and the network:
//!
//! - a session cache of diagram source text held in the [`Snapshot`]'s
//!   `graph_cache`, keyed by diagram name, populated on first successful
//!   fetch and cleared only by an explicit cache-clear;
//! - a persistent cache behind the [`DiagramCache`] capability, keyed by
//!   request URL, consulted by [`OfflineProxy`] when the network is down
//!   so a previously seen diagram can still be shown (marked stale).
//!
//! Load sequence per tab activation: session cache → API → persistent
//! fallback → display.
//!
//! [`Snapshot`]: crate::store::Snapshot

mod cache;
mod proxy;

pub use cache::{DiagramCache, FileDiagramCache, MemoryDiagramCache};
pub use proxy::{OfflineProxy, CACHED_MARKER};

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiClient, NetworkError};
use crate::store::{StateStore, StateUpdate};

/// Ceiling on a whole diagram-load operation, independent of the
/// per-request transport timeout.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// The fixed set of server-rendered diagrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Diagram {
    Orchestration,
    Skills,
    Swarms,
    Personas,
    Recipes,
}

impl Diagram {
    pub const ALL: [Diagram; 5] = [
        Diagram::Orchestration,
        Diagram::Skills,
        Diagram::Swarms,
        Diagram::Personas,
        Diagram::Recipes,
    ];

    /// Wire name, as used in the API path.
    pub fn name(&self) -> &'static str {
        match self {
            Diagram::Orchestration => "orchestration",
            Diagram::Skills => "skills",
            Diagram::Swarms => "swarms",
            Diagram::Personas => "personas",
            Diagram::Recipes => "recipes",
        }
    }

    /// API path serving this diagram.
    pub fn api_path(&self) -> String {
        format!("/api/mermaid/{}", self.name())
    }

    /// Parse a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.name() == name)
    }
}

impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a diagram could not be shown. Fetch failures, load timeouts, and
/// syntax problems are reported distinctly.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("failed to load diagram: {0}")]
    Load(#[from] NetworkError),
    #[error("diagram load timed out")]
    Timeout,
    #[error("diagram syntax error: {0}")]
    Syntax(String),
}

/// A successfully loaded diagram.
#[derive(Debug, Clone)]
pub struct LoadedDiagram {
    /// Mermaid source text.
    pub source: String,
    /// Served from the session cache; no request was made.
    pub from_session_cache: bool,
    /// Served by the persistent fallback while the network was down.
    pub stale: bool,
}

/// Drives the load sequence for diagram tabs.
pub struct GraphLoader {
    proxy: OfflineProxy,
}

impl GraphLoader {
    pub fn new(proxy: OfflineProxy) -> Self {
        Self { proxy }
    }

    /// Load a diagram: session cache first, then the network with
    /// persistent fallback. A successful fetch populates the session cache
    /// through the store. The whole operation is bounded by
    /// [`LOAD_TIMEOUT`].
    pub async fn load(
        &mut self,
        api: &ApiClient,
        diagram: Diagram,
        store: &StateStore,
    ) -> Result<LoadedDiagram, DiagramError> {
        if let Some(source) = store.get().graph_cache.get(&diagram) {
            debug!(%diagram, "session cache hit");
            return Ok(LoadedDiagram {
                source: source.clone(),
                from_session_cache: true,
                stale: false,
            });
        }

        let fetch = self.proxy.fetch(api, diagram);
        let (payload, stale) = tokio::time::timeout(LOAD_TIMEOUT, fetch)
            .await
            .map_err(|_| DiagramError::Timeout)??;

        let source = payload
            .get("graph_syntax")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        store.set(StateUpdate {
            graph: Some((diagram, source.clone())),
            ..Default::default()
        });

        Ok(LoadedDiagram {
            source,
            from_session_cache: false,
            stale,
        })
    }
}

/// Known Mermaid diagram-type headers.
const DIAGRAM_HEADERS: [&str; 11] = [
    "graph",
    "flowchart",
    "sequenceDiagram",
    "stateDiagram",
    "classDiagram",
    "erDiagram",
    "gantt",
    "pie",
    "journey",
    "mindmap",
    "timeline",
];

/// Check that diagram source begins with a recognized diagram-type header.
/// This is the syntax-level check that distinguishes "diagram syntax error"
/// from a fetch failure.
pub fn check_syntax(source: &str) -> Result<(), DiagramError> {
    let first = source
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("%%"));
    match first {
        None => Err(DiagramError::Syntax("empty diagram source".to_string())),
        Some(line) if DIAGRAM_HEADERS.iter().any(|h| line.starts_with(h)) => Ok(()),
        Some(line) => {
            let header: String = line.chars().take(40).collect();
            Err(DiagramError::Syntax(format!("unrecognized header: {}", header)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{CannedResponse, TestServer};
    use serde_json::json;
    use std::collections::HashMap;

    fn loader() -> GraphLoader {
        GraphLoader::new(OfflineProxy::new(Box::new(MemoryDiagramCache::default())))
    }

    #[test]
    fn test_diagram_names_round_trip() {
        for diagram in Diagram::ALL {
            assert_eq!(Diagram::from_name(diagram.name()), Some(diagram));
        }
        assert_eq!(Diagram::from_name("charts"), None);
        assert_eq!(Diagram::Skills.api_path(), "/api/mermaid/skills");
    }

    #[test]
    fn test_check_syntax() {
        assert!(check_syntax("graph TD\n  a --> b").is_ok());
        assert!(check_syntax("%% comment\nflowchart LR\n  a --> b").is_ok());
        assert!(check_syntax("stateDiagram-v2\n  [*] --> idle").is_ok());

        assert!(matches!(check_syntax(""), Err(DiagramError::Syntax(_))));
        assert!(matches!(
            check_syntax("<html>not a diagram</html>"),
            Err(DiagramError::Syntax(_))
        ));
    }

    #[tokio::test]
    async fn test_second_load_served_from_session_cache() {
        let mut routes = HashMap::new();
        routes.insert(
            "/api/mermaid/skills".to_string(),
            CannedResponse::json(200, json!({"graph_syntax": "graph TD\n  a --> b"})),
        );
        let server = TestServer::start(routes).await;
        let api = ApiClient::new(&server.base_url);
        let store = crate::store::StateStore::new();
        let mut loader = loader();

        let first = loader.load(&api, Diagram::Skills, &store).await.unwrap();
        assert!(!first.from_session_cache);
        assert_eq!(first.source, "graph TD\n  a --> b");

        let second = loader.load(&api, Diagram::Skills, &store).await.unwrap();
        assert!(second.from_session_cache);
        assert_eq!(second.source, first.source);

        // Exactly one network request for the two loads.
        assert_eq!(server.hit_count("/api/mermaid/skills"), 1);
    }

    #[tokio::test]
    async fn test_cache_clear_forces_refetch() {
        let mut routes = HashMap::new();
        routes.insert(
            "/api/mermaid/personas".to_string(),
            CannedResponse::json(200, json!({"graph_syntax": "graph LR\n  x --> y"})),
        );
        let server = TestServer::start(routes).await;
        let api = ApiClient::new(&server.base_url);
        let store = crate::store::StateStore::new();
        let mut loader = loader();

        loader.load(&api, Diagram::Personas, &store).await.unwrap();
        store.set(StateUpdate {
            clear_graph_cache: true,
            ..Default::default()
        });
        loader.load(&api, Diagram::Personas, &store).await.unwrap();

        assert_eq!(server.hit_count("/api/mermaid/personas"), 2);
    }
}
