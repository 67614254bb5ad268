use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use crate::config::constants::poll_interval;
use crate::enums::analysis_status::AnalysisStatus;
use crate::enums::poll_outcome::PollOutcome;
use crate::enums::session_status::SessionStatus;
use crate::services::comment_ingestor::CommentIngestor;
use crate::services::session_store::SessionStore;
use crate::structs::config::polling_config::PollingConfig;
use crate::traits::review_backend::ReviewBackend;

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_ticks: u32,
    pub error_threshold: u32,
}

impl PollSettings {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            interval: poll_interval(config.interval_secs),
            max_ticks: config.max_ticks,
            error_threshold: config.error_threshold,
        }
    }
}

struct PollJob {
    cancel: watch::Sender<bool>,
    generation: u64,
}

pub type CompletionCallback = Box<dyn FnOnce(PollOutcome) + Send>;

/// Drives the fetch loop for submitted reviews: one cancellable task per
/// job id, strictly sequential ticks within a job, a hard tick cap and a
/// consecutive-error threshold so the loop always terminates. Stopping a
/// job is idempotent, and a stopped job never applies a late response.
pub struct PollingCoordinator {
    jobs: Arc<DashMap<String, PollJob>>,
    backend: Arc<dyn ReviewBackend>,
    ingestor: Arc<CommentIngestor>,
    store: Arc<SessionStore>,
    settings: PollSettings,
    generation: AtomicU64,
}

impl PollingCoordinator {
    pub fn new(
        backend: Arc<dyn ReviewBackend>,
        ingestor: Arc<CommentIngestor>,
        store: Arc<SessionStore>,
        settings: PollSettings,
    ) -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
            backend,
            ingestor,
            store,
            settings,
            generation: AtomicU64::new(0),
        }
    }

    /// Begins polling for a job. An existing poller for the same id is
    /// cancelled first; the completion callback fires exactly once when the
    /// loop ends on its own, and not at all when the job is stopped.
    pub fn start(&self, data_id: String, on_complete: CompletionCallback) {
        self.stop(&data_id);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        self.jobs.insert(data_id.clone(), PollJob { cancel: cancel_tx, generation });

        let jobs = Arc::clone(&self.jobs);
        let backend = Arc::clone(&self.backend);
        let ingestor = Arc::clone(&self.ingestor);
        let store = Arc::clone(&self.store);
        let settings = self.settings;

        tokio::spawn(async move {
            let outcome = poll_loop(backend, ingestor, store, settings, &data_id, cancel_rx).await;
            jobs.remove_if(&data_id, |_, job| job.generation == generation);
            if let Some(outcome) = outcome {
                on_complete(outcome);
            }
        });
    }

    /// Cancels the job's timer immediately regardless of status. Stopping a
    /// job that is not polling is a no-op.
    pub fn stop(&self, data_id: &str) -> bool {
        if let Some((_, job)) = self.jobs.remove(data_id) {
            let _ = job.cancel.send(true);
            true
        } else {
            false
        }
    }

    pub fn is_active(&self, data_id: &str) -> bool {
        self.jobs.contains_key(data_id)
    }
}

async fn poll_loop(
    backend: Arc<dyn ReviewBackend>,
    ingestor: Arc<CommentIngestor>,
    store: Arc<SessionStore>,
    settings: PollSettings,
    data_id: &str,
    mut cancel_rx: watch::Receiver<bool>,
) -> Option<PollOutcome> {
    // first tick fires immediately, then at the fixed interval
    let mut interval = tokio::time::interval(settings.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks: u32 = 0;
    let mut consecutive_errors: u32 = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = cancel_rx.changed() => return None,
        }
        if *cancel_rx.borrow() {
            return None;
        }
        ticks += 1;

        let mut tick_failed = false;
        let mut status = None;

        match backend.fetch_status(data_id).await {
            Ok(response) => {
                status = response.status();
                if status.is_none() {
                    log::error!(
                        "⚠️ Unknown analysis status '{}' for job {}",
                        response.analysis_status,
                        data_id
                    );
                }
            }
            Err(e) => {
                tick_failed = true;
                log::error!("⚠️ Status fetch failed for job {}: {}", data_id, e);
            }
        }
        // a stop may have raced the fetch; never apply a late response
        if *cancel_rx.borrow() {
            return None;
        }

        if !tick_failed {
            match backend.fetch_comments(data_id).await {
                Ok(response) => {
                    if *cancel_rx.borrow() {
                        return None;
                    }
                    for raw in &response.comments {
                        ingestor.ingest(data_id, raw);
                    }
                }
                Err(e) => {
                    tick_failed = true;
                    log::error!("⚠️ Comment fetch failed for job {}: {}", data_id, e);
                }
            }
        }

        if tick_failed {
            consecutive_errors += 1;
            if consecutive_errors >= settings.error_threshold {
                log::error!(
                    "🛑 Giving up on job {} after {} consecutive fetch errors",
                    data_id,
                    consecutive_errors
                );
                return Some(PollOutcome::ErrorsExhausted);
            }
        } else {
            consecutive_errors = 0;
        }

        if let Some(status) = status {
            if status.is_terminal() {
                let (session_status, outcome) = if status == AnalysisStatus::Completed {
                    (SessionStatus::Completed, PollOutcome::Completed)
                } else {
                    (SessionStatus::Failed, PollOutcome::Failed)
                };
                store.set_status(data_id, session_status);
                log::info!("🏁 Job {} reached terminal status '{}' after {} tick(s)", data_id, status, ticks);
                return Some(outcome);
            }
        }

        if ticks >= settings.max_ticks {
            // implicit completion: the session keeps its last observed status
            log::error!("⏱️ Poll tick cap reached for job {}; stopping", data_id);
            return Some(PollOutcome::TickCapReached);
        }
    }
}
