//! Shared loopback mock backend for client integration tests.
//!
//! Serves the subset of the AgriWatch API the client exercises, with
//! atomic per-route call counters so tests can assert how many
//! requests actually hit the wire.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::watch;
use uuid::Uuid;

use agriwatch_client::poller::PollState;

pub const WHEAT_FARM_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const RICE_FARM_ID: &str = "22222222-2222-2222-2222-222222222222";
pub const MISSING_FARM_ID: &str = "99999999-9999-9999-9999-999999999999";

/// Shared state for the mock backend.
#[derive(Default)]
pub struct MockBackend {
    pub list_calls: AtomicUsize,
    pub farm_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub result_calls: AtomicUsize,
    /// Serve this many 500s on the status route before resuming normal
    /// responses.
    pub fail_next_polls: AtomicUsize,
    /// Status sequence served by the job-status route. The last entry
    /// repeats once the rest are consumed.
    pub statuses: Mutex<Vec<&'static str>>,
}

impl MockBackend {
    pub fn with_statuses(statuses: Vec<&'static str>) -> Arc<Self> {
        let backend = Self {
            statuses: Mutex::new(statuses),
            ..Default::default()
        };
        Arc::new(backend)
    }
}

/// Bind the mock backend on a random loopback port and return its base URL.
pub async fn spawn_backend(state: Arc<MockBackend>) -> String {
    let app = Router::new()
        .route("/api/farms", get(list_farms).post(create_farm))
        .route(
            "/api/farms/{id}",
            get(get_farm).put(update_farm).delete(delete_farm),
        )
        .route("/api/analysis/{job_id}", get(job_status))
        .route("/api/analysis/{job_id}/result", get(job_result))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn farm_json(id: &str, name: &str, location: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "location": location,
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[75.5, 31.3], [75.55, 31.3], [75.55, 31.35], [75.5, 31.35], [75.5, 31.3]]],
        },
        "area_sqm": 10000.0,
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z",
        "latest_ndvi": 0.62,
    })
}

fn job_json(job_id: Uuid, status: &str) -> Value {
    let progress = match status {
        "pending" | "queued" => 0,
        "processing" => 50,
        _ => 100,
    };
    json!({
        "job_id": job_id,
        "status": status,
        "created_at": "2025-01-15T10:00:00Z",
        "progress": progress,
        "message": "mock job",
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_farms(
    State(state): State<Arc<MockBackend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let farms = vec![
        farm_json(WHEAT_FARM_ID, "Wheat Field North", "Hoshiarpur, Punjab"),
        farm_json(RICE_FARM_ID, "Rice Paddy", "Ludhiana, Punjab"),
    ];
    let filtered: Vec<Value> = match params.get("search") {
        Some(search) => {
            let needle = search.to_lowercase();
            farms
                .into_iter()
                .filter(|f| {
                    f["name"]
                        .as_str()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
                })
                .collect()
        }
        None => farms,
    };
    Json(Value::Array(filtered))
}

async fn create_farm(
    State(state): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.farm_calls.fetch_add(1, Ordering::SeqCst);
    let name = body["name"].as_str().unwrap_or("Unnamed");
    Json(farm_json(&Uuid::new_v4().to_string(), name, "Somewhere"))
}

async fn get_farm(
    State(state): State<Arc<MockBackend>>,
    Path(id): Path<Uuid>,
) -> (StatusCode, Json<Value>) {
    state.farm_calls.fetch_add(1, Ordering::SeqCst);
    if id.to_string() == WHEAT_FARM_ID {
        (
            StatusCode::OK,
            Json(farm_json(WHEAT_FARM_ID, "Wheat Field North", "Hoshiarpur, Punjab")),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Farm not found" })),
        )
    }
}

async fn update_farm(
    State(state): State<Arc<MockBackend>>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.farm_calls.fetch_add(1, Ordering::SeqCst);
    if id.to_string() != WHEAT_FARM_ID {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Farm not found" })),
        );
    }
    let name = body["name"].as_str().unwrap_or("Wheat Field North");
    (
        StatusCode::OK,
        Json(farm_json(WHEAT_FARM_ID, name, "Hoshiarpur, Punjab")),
    )
}

async fn delete_farm(
    State(state): State<Arc<MockBackend>>,
    Path(id): Path<Uuid>,
) -> (StatusCode, Json<Value>) {
    state.farm_calls.fetch_add(1, Ordering::SeqCst);
    if id.to_string() == WHEAT_FARM_ID {
        (StatusCode::OK, Json(json!({ "message": "Farm deleted successfully" })))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Farm not found" })),
        )
    }
}

async fn job_status(
    State(state): State<Arc<MockBackend>>,
    Path(job_id): Path<Uuid>,
) -> (StatusCode, Json<Value>) {
    state.status_calls.fetch_add(1, Ordering::SeqCst);

    let failures_left = state.fail_next_polls.load(Ordering::SeqCst);
    if failures_left > 0 {
        state.fail_next_polls.store(failures_left - 1, Ordering::SeqCst);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Transient backend error" })),
        );
    }

    let status = {
        let mut statuses = state.statuses.lock().expect("statuses lock");
        if statuses.len() > 1 {
            statuses.remove(0)
        } else {
            statuses.first().copied().unwrap_or("processing")
        }
    };
    (StatusCode::OK, Json(job_json(job_id, status)))
}

async fn job_result(
    State(state): State<Arc<MockBackend>>,
    Path(job_id): Path<Uuid>,
) -> Json<Value> {
    state.result_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "job_id": job_id,
        "status": "completed",
        "indices": { "ndvi": 0.65, "ndre": 0.45, "lswi": 0.25 },
        "statistics": {
            "ndvi": { "min": 0.2, "max": 0.85, "mean": 0.65, "std": 0.15 },
        },
        "images_processed": 12,
        "date_range": { "start": "2024-11-01", "end": "2025-01-31" },
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[75.5, 31.3], [75.55, 31.3], [75.55, 31.35], [75.5, 31.35], [75.5, 31.3]]],
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Wait until the poll state satisfies a predicate, cloning it out.
pub async fn wait_for_state<F>(
    rx: &mut watch::Receiver<PollState>,
    timeout: Duration,
    pred: F,
) -> PollState
where
    F: Fn(&PollState) -> bool,
{
    tokio::time::timeout(timeout, async {
        loop {
            {
                let current = rx.borrow();
                if pred(&current) {
                    return current.clone();
                }
            }
            rx.changed().await.expect("watcher dropped");
        }
    })
    .await
    .expect("timed out waiting for poll state")
}
