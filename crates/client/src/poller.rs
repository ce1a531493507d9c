//! Job-status polling engine for long-running analysis jobs.
//!
//! [`JobWatcher`] owns at most one polling loop at a time. Pointing it
//! at a job id spawns a task that fetches the job status at a fixed
//! cadence until a terminal state is observed, then stops: on
//! `completed` it fetches the result exactly once (memoized per job
//! id), on `failed` it stops without a result fetch. Pointing the
//! watcher at `None` or a different id cancels the previous loop;
//! a cancelled loop never publishes again.
//!
//! Observers subscribe to a [`watch`] channel carrying the latest
//! [`PollState`]. Statuses are published monotonically: an
//! out-of-order observation from the backend is dropped, never
//! displayed. A transient error on one poll attempt is published as
//! [`PollState::Retrying`] so the UI can show it inline while the loop
//! keeps going at the same cadence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use agriwatch_core::analysis::{AnalysisJob, AnalysisResult};
use agriwatch_core::job::JobStatus;
use agriwatch_core::types::JobId;

use crate::http::ApiClient;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable parameters for the polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Cadence between status fetches. A policy value, not a
    /// correctness requirement: any fixed interval preserves the
    /// contract of eventually observing a terminal state.
    pub interval: Duration,
    /// Consecutive transient failures tolerated before the loop gives
    /// up in a [`PollState::Stalled`] state. A successful poll resets
    /// the counter.
    pub max_consecutive_failures: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_consecutive_failures: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Published state
// ---------------------------------------------------------------------------

/// Latest known state of the watched job, published to subscribers.
#[derive(Debug, Clone)]
pub enum PollState {
    /// No job is being watched; no network activity.
    Idle,
    /// The job is pending, queued, or processing.
    Active(AnalysisJob),
    /// The last poll attempt failed; the loop is still retrying at the
    /// configured cadence. Replaced by `Active` on the next success.
    Retrying {
        job_id: JobId,
        error: String,
        /// Consecutive failures so far, starting at 1.
        attempt: u32,
    },
    /// The job completed and its result snapshot was retrieved.
    Completed {
        job_id: JobId,
        result: Arc<AnalysisResult>,
    },
    /// The backend reported the job as failed.
    Failed(AnalysisJob),
    /// Polling gave up after exhausting the failure budget, or the
    /// one-shot result fetch failed. The job itself may still be
    /// running server-side; re-watching the id starts a fresh loop.
    Stalled { job_id: JobId, error: String },
}

impl PollState {
    /// Whether this state ends the polling loop.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed(_) | Self::Stalled { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Watcher
// ---------------------------------------------------------------------------

struct ActiveWatch {
    job_id: JobId,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

struct WatchInner {
    /// Bumped on every [`JobWatcher::watch`] call; publishes from loops
    /// spawned under an older generation are discarded.
    generation: u64,
    active: Option<ActiveWatch>,
}

/// Watches one analysis job at a time, driving the polling protocol.
///
/// Create once per view/session via [`JobWatcher::new`]; the returned
/// `Arc` is cheap to clone into UI tasks.
pub struct JobWatcher {
    client: Arc<ApiClient>,
    config: PollConfig,
    state_tx: watch::Sender<PollState>,
    inner: Mutex<WatchInner>,
    /// Result snapshots by job id. Guarantees the result endpoint is
    /// hit at most once per job, even across re-watches of the same id.
    results: Mutex<HashMap<JobId, Arc<AnalysisResult>>>,
}

impl JobWatcher {
    pub fn new(client: Arc<ApiClient>, config: PollConfig) -> Arc<Self> {
        let (state_tx, _) = watch::channel(PollState::Idle);
        Arc::new(Self {
            client,
            config,
            state_tx,
            inner: Mutex::new(WatchInner {
                generation: 0,
                active: None,
            }),
            results: Mutex::new(HashMap::new()),
        })
    }

    /// Subscribe to state updates. The receiver immediately holds the
    /// current state.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_tx.subscribe()
    }

    /// The id currently being watched, if any loop is active.
    pub fn watched_job(&self) -> Option<JobId> {
        let inner = self.inner.lock().expect("watcher lock poisoned");
        inner.active.as_ref().map(|a| a.job_id)
    }

    /// Point the watcher at a job id (or at nothing).
    ///
    /// Any previous loop is cancelled first and can no longer publish.
    /// `None` publishes [`PollState::Idle`] and performs no network
    /// activity. A known-completed id is served from the result memo
    /// without spawning a loop.
    pub fn watch(self: &Arc<Self>, job_id: Option<JobId>) {
        let mut inner = self.inner.lock().expect("watcher lock poisoned");
        inner.generation += 1;
        let generation = inner.generation;

        if let Some(previous) = inner.active.take() {
            tracing::debug!(job_id = %previous.job_id, "Cancelling previous poll loop");
            previous.cancel.cancel();
        }

        let Some(job_id) = job_id else {
            self.state_tx.send_replace(PollState::Idle);
            return;
        };

        if let Some(result) = self
            .results
            .lock()
            .expect("result memo lock poisoned")
            .get(&job_id)
            .cloned()
        {
            tracing::debug!(job_id = %job_id, "Serving memoized result, no poll loop");
            self.state_tx
                .send_replace(PollState::Completed { job_id, result });
            return;
        }

        let cancel = CancellationToken::new();
        let watcher = Arc::clone(self);
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            run_poll_loop(Arc::clone(&watcher), job_id, generation, task_cancel).await;
            watcher.finish(generation);
        });

        inner.active = Some(ActiveWatch {
            job_id,
            cancel,
            handle,
        });
    }

    /// Cancel any active loop and publish [`PollState::Idle`].
    pub async fn shutdown(&self) {
        let active = {
            let mut inner = self.inner.lock().expect("watcher lock poisoned");
            inner.generation += 1;
            inner.active.take()
        };
        if let Some(active) = active {
            active.cancel.cancel();
            let _ = tokio::time::timeout(Duration::from_secs(5), active.handle).await;
        }
        self.state_tx.send_replace(PollState::Idle);
    }

    /// Drop the active-watch record once its loop has exited on its
    /// own. Guarded by `generation` so a loop superseded by a newer
    /// `watch` call never clears its successor.
    fn finish(&self, generation: u64) {
        let mut inner = self.inner.lock().expect("watcher lock poisoned");
        if inner.generation == generation {
            inner.active = None;
        }
    }

    /// Publish a state update if `generation` is still current.
    fn publish(&self, generation: u64, state: PollState) {
        let inner = self.inner.lock().expect("watcher lock poisoned");
        if inner.generation == generation {
            self.state_tx.send_replace(state);
        } else {
            tracing::trace!("Dropping publish from stale poll loop");
        }
    }
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

/// Status polling loop for one job id.
///
/// Requests are strictly sequential: the next tick is not processed
/// while a fetch is outstanding, so at most one request per job is
/// ever in flight.
async fn run_poll_loop(
    watcher: Arc<JobWatcher>,
    job_id: JobId,
    generation: u64,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(watcher.config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut failures = 0u32;
    let mut last_status: Option<JobStatus> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return,
            res = watcher.client.job_status(job_id) => res,
        };

        match response {
            Err(e) => {
                failures += 1;
                tracing::warn!(
                    job_id = %job_id,
                    error = %e,
                    consecutive = failures,
                    "Status poll failed",
                );
                if failures >= watcher.config.max_consecutive_failures {
                    watcher.publish(
                        generation,
                        PollState::Stalled {
                            job_id,
                            error: e.display_message(),
                        },
                    );
                    return;
                }
                watcher.publish(
                    generation,
                    PollState::Retrying {
                        job_id,
                        error: e.display_message(),
                        attempt: failures,
                    },
                );
            }
            Ok(job) => {
                failures = 0;

                // Displayed status must never move backward.
                if let Some(prev) = last_status {
                    if !job.status.may_follow(prev) {
                        tracing::debug!(
                            job_id = %job_id,
                            previous = ?prev,
                            observed = ?job.status,
                            "Ignoring backward status transition",
                        );
                        continue;
                    }
                }
                last_status = Some(job.status);

                match job.status {
                    JobStatus::Failed => {
                        tracing::info!(job_id = %job_id, "Job failed, polling stopped");
                        watcher.publish(generation, PollState::Failed(job));
                        return;
                    }
                    JobStatus::Completed => {
                        fetch_result_once(&watcher, job_id, generation, &cancel).await;
                        return;
                    }
                    _ => {
                        watcher.publish(generation, PollState::Active(job));
                    }
                }
            }
        }
    }
}

/// One-shot result retrieval after the first observed `completed`.
async fn fetch_result_once(
    watcher: &JobWatcher,
    job_id: JobId,
    generation: u64,
    cancel: &CancellationToken,
) {
    // A prior watch of this id may already have fetched it.
    let memoized = watcher
        .results
        .lock()
        .expect("result memo lock poisoned")
        .get(&job_id)
        .cloned();
    if let Some(result) = memoized {
        watcher.publish(generation, PollState::Completed { job_id, result });
        return;
    }

    let response = tokio::select! {
        _ = cancel.cancelled() => return,
        res = watcher.client.job_result(job_id) => res,
    };

    match response {
        Ok(result) => {
            let result = Arc::new(result);
            watcher
                .results
                .lock()
                .expect("result memo lock poisoned")
                .insert(job_id, Arc::clone(&result));
            tracing::info!(job_id = %job_id, "Result retrieved, polling stopped");
            watcher.publish(generation, PollState::Completed { job_id, result });
        }
        Err(e) => {
            tracing::warn!(job_id = %job_id, error = %e, "Result fetch failed");
            watcher.publish(
                generation,
                PollState::Stalled {
                    job_id,
                    error: e.display_message(),
                },
            );
        }
    }
}
