//! Offline-aware fetch path for diagram requests.
//!
//! Mirrors a network-level response cache scoped to diagram fetches: every
//! successful response is stored keyed by request URL, and the cache is
//! consulted only when the network itself fails (status 0). An HTTP error
//! response from the origin passes through untouched. Cache hits are
//! tagged with `_sw_cached: true` so the caller can visibly distinguish
//! stale content; a miss yields a synthetic 503 instead of a raw transport
//! error.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::api::{self, ApiClient, NetworkError};

use super::{Diagram, DiagramCache};

/// Marker injected into payloads served from the persistent cache. Never
/// set by the origin server.
pub const CACHED_MARKER: &str = "_sw_cached";

/// Fetches diagram payloads with a persistent-cache fallback.
pub struct OfflineProxy {
    cache: Box<dyn DiagramCache>,
}

impl OfflineProxy {
    pub fn new(cache: Box<dyn DiagramCache>) -> Self {
        Self { cache }
    }

    /// Fetch a diagram payload. Returns the payload and whether it was
    /// served stale from the persistent cache.
    pub async fn fetch(
        &mut self,
        api: &ApiClient,
        diagram: Diagram,
    ) -> Result<(Value, bool), NetworkError> {
        let path = diagram.api_path();
        let key = api.url_for(&path);

        match api.get(&path).await {
            Ok(payload) => {
                self.cache.store(&key, &payload.to_string());
                Ok((payload, false))
            }
            // Only a genuine transport failure triggers the fallback.
            Err(err) if err.status == 0 => match self.cache.lookup(&key) {
                Some(cached) => {
                    debug!(%diagram, "serving diagram from persistent cache");
                    let mut payload: Value =
                        serde_json::from_str(&cached).unwrap_or_else(|_| json!({}));
                    if let Some(object) = payload.as_object_mut() {
                        object.insert(CACHED_MARKER.to_string(), Value::Bool(true));
                    }
                    Ok((payload, true))
                }
                None => {
                    warn!(%diagram, error = %err, "offline with no cached diagram");
                    let body = json!({
                        "error": "offline",
                        "detail": "No cached diagram available.",
                    });
                    Err(NetworkError {
                        message: api::error_message(&body, 503),
                        status: 503,
                        url: key,
                    })
                }
            },
            Err(err) => Err(err),
        }
    }
}
