//! Status aggregation: the five-way fan-out.
//!
//! [`fetch_status`] queries the five status resources concurrently. Each
//! leg is independently guarded: a failed request substitutes that
//! resource's documented fallback instead of failing the aggregate. All
//! five results land in the store in a single `set`, so a render never
//! observes a torn snapshot with some resources updated and others not.

use std::rc::Rc;

use serde_json::{json, Value};
use tracing::warn;

use crate::api::ApiClient;
use crate::store::{Snapshot, StateStore, StateUpdate};

/// Fetch all five status resources concurrently and publish them in one
/// store update. Returns the resulting snapshot.
pub async fn fetch_status(api: &ApiClient, store: &StateStore) -> Rc<Snapshot> {
    let (llm, solace, skills, swarms, personas) = tokio::join!(
        fetch_or(api, "/api/llm/status", json!({"online": false})),
        fetch_or(api, "/api/solace-agi/status", json!({"configured": false})),
        fetch_or(api, "/api/skills/list", json!({"count": 0, "skills": []})),
        fetch_or(api, "/api/swarms/list", json!({"count": 0, "swarms": []})),
        fetch_or(api, "/api/personas/list", json!({"count": 0, "personas": []})),
    );

    store.set(StateUpdate {
        llm: Some(llm),
        solace: Some(solace),
        skills: Some(skills),
        swarms: Some(swarms),
        personas: Some(personas),
        ..Default::default()
    });
    store.get()
}

async fn fetch_or(api: &ApiClient, path: &str, fallback: Value) -> Value {
    match api.get(path).await {
        Ok(value) => value,
        Err(err) => {
            warn!(path, error = %err, "status fetch failed, using fallback");
            fallback
        }
    }
}
