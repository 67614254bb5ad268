use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::oneshot;

use revline::enums::file_status::FileStatus;
use revline::enums::poll_outcome::PollOutcome;
use revline::enums::session_status::SessionStatus;
use revline::errors::{RevlineError, RevlineResult};
use revline::helpers::compression;
use revline::services::change_set_resolver::ChangeSetResolver;
use revline::services::comment_ingestor::CommentIngestor;
use revline::services::content_hasher::ContentHasher;
use revline::services::polling_coordinator::{PollSettings, PollingCoordinator};
use revline::services::review_orchestrator::{ReviewOrchestrator, ReviewOutcome};
use revline::services::session_store::{SessionMeta, SessionStore};
use revline::structs::api::comments_response::CommentsResponse;
use revline::structs::api::raw_comment::RawComment;
use revline::structs::api::review_request::{FileEntry, ReviewRequest};
use revline::structs::api::status_response::StatusResponse;
use revline::structs::api::submit_response::SubmitResponse;
use revline::structs::file_snapshot::FileSnapshot;
use revline::structs::resolved_change::ResolvedChange;
use revline::structs::session::branch_ref::BranchRef;
use revline::traits::change_provider::ChangeProvider;
use revline::traits::comment_sink::CommentSink;
use revline::traits::review_backend::ReviewBackend;

struct RecordingSink {
    rendered: Mutex<Vec<(String, u32, String)>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self { rendered: Mutex::new(Vec::new()) })
    }

    fn count(&self) -> usize {
        self.rendered.lock().unwrap().len()
    }
}

impl CommentSink for RecordingSink {
    fn render_comment(&self, file_path: &str, line: u32, body: &str) {
        self.rendered
            .lock()
            .unwrap()
            .push((file_path.to_string(), line, body.to_string()));
    }

    fn clear_all(&self) {
        self.rendered.lock().unwrap().clear();
    }
}

/// Backend that replays a script of (status, comments) per poll tick.
/// `fetch_status` reads the front of the script; `fetch_comments` consumes
/// it. When the script runs dry, `final_status` is reported with no
/// comments.
struct ScriptedBackend {
    script: Mutex<VecDeque<(String, Vec<RawComment>)>>,
    final_status: String,
    comment_delay: Duration,
    fail_fetches: bool,
    status_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn build(
        script: Vec<(&str, Vec<RawComment>)>,
        final_status: &str,
        comment_delay: Duration,
        fail_fetches: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|(status, comments)| (status.to_string(), comments))
                    .collect(),
            ),
            final_status: final_status.to_string(),
            comment_delay,
            fail_fetches,
            status_calls: AtomicUsize::new(0),
        })
    }

    fn new(script: Vec<(&str, Vec<RawComment>)>, final_status: &str) -> Arc<Self> {
        Self::build(script, final_status, Duration::ZERO, false)
    }

    fn never_terminal() -> Arc<Self> {
        Self::build(Vec::new(), "running", Duration::ZERO, false)
    }

    fn failing() -> Arc<Self> {
        Self::build(Vec::new(), "running", Duration::ZERO, true)
    }

    fn with_comment_delay(script: Vec<(&str, Vec<RawComment>)>, delay: Duration) -> Arc<Self> {
        Self::build(script, "running", delay, false)
    }
}

#[async_trait]
impl ReviewBackend for ScriptedBackend {
    async fn submit_review(&self, _request: &ReviewRequest) -> RevlineResult<SubmitResponse> {
        Ok(SubmitResponse {
            extension_data_id: Some("job-1".to_string()),
            comments: Vec::new(),
        })
    }

    async fn fetch_status(&self, data_id: &str) -> RevlineResult<StatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches {
            return Err(RevlineError::network_error(
                "status fetch",
                None,
                Some(503),
                "unavailable",
            ));
        }
        let status = self
            .script
            .lock()
            .unwrap()
            .front()
            .map(|(status, _)| status.clone())
            .unwrap_or_else(|| self.final_status.clone());
        Ok(StatusResponse {
            analysis_status: status,
            data_id: data_id.to_string(),
        })
    }

    async fn fetch_comments(&self, _data_id: &str) -> RevlineResult<CommentsResponse> {
        if self.comment_delay > Duration::ZERO {
            tokio::time::sleep(self.comment_delay).await;
        }
        let comments = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .map(|(_, comments)| comments)
            .unwrap_or_default();
        let count = comments.len();
        Ok(CommentsResponse { comments, count })
    }

    async fn stop_analysis(&self, data_id: &str) -> RevlineResult<StatusResponse> {
        Ok(StatusResponse {
            analysis_status: "failed".to_string(),
            data_id: data_id.to_string(),
        })
    }
}

struct StubProvider {
    snapshots: Vec<FileSnapshot>,
}

#[async_trait]
impl ChangeProvider for StubProvider {
    async fn list_changed_files(&self) -> RevlineResult<Vec<FileSnapshot>> {
        Ok(self.snapshots.clone())
    }

    async fn baseline_content(&self, _path: &str) -> RevlineResult<Option<String>> {
        Ok(None)
    }

    async fn branch_ref(&self, base: &str) -> RevlineResult<BranchRef> {
        Ok(BranchRef { from: "feature/login".to_string(), to: base.to_string() })
    }
}

fn raw_comment(file_path: &str, line: u32, title: &str) -> RawComment {
    RawComment {
        file_path: file_path.to_string(),
        line_start: line,
        line_end: line,
        title: Some(title.to_string()),
        confidence: Some(0.8),
        content: format!("**Severity**: High\n{}", title),
    }
}

fn change(path: &str, content: &str) -> ResolvedChange {
    ResolvedChange {
        path: path.to_string(),
        status: FileStatus::Modified,
        patch: format!("+{}", content),
        additions: 1,
        deletions: 0,
        content: content.to_string(),
    }
}

fn store_with_session(dir: &TempDir, data_id: &str) -> (Arc<SessionStore>, Arc<RecordingSink>) {
    let sink = RecordingSink::new();
    let store = Arc::new(SessionStore::new(
        dir.path().join("sessions.json"),
        sink.clone(),
    ));
    store.create_session(
        SessionMeta {
            data_id: data_id.to_string(),
            title: "integration review".to_string(),
            branch: BranchRef { from: "work".to_string(), to: "main".to_string() },
        },
        &[change("src/lib.rs", "fn lib() {}")],
    );
    (store, sink)
}

fn fast_settings(max_ticks: u32, error_threshold: u32) -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(5),
        max_ticks,
        error_threshold,
    }
}

fn coordinator_for(
    backend: Arc<ScriptedBackend>,
    store: Arc<SessionStore>,
    sink: Arc<RecordingSink>,
    settings: PollSettings,
) -> PollingCoordinator {
    let ingestor = Arc::new(CommentIngestor::new(store.clone(), sink));
    PollingCoordinator::new(backend, ingestor, store, settings)
}

#[tokio::test]
async fn polling_stops_at_the_tick_cap_with_one_completion() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store_with_session(&dir, "job-1");
    let backend = ScriptedBackend::never_terminal();
    let coordinator = coordinator_for(backend.clone(), store.clone(), sink, fast_settings(20, 5));

    let completions = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();
    let counter = completions.clone();
    coordinator.start(
        "job-1".to_string(),
        Box::new(move |outcome| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(outcome);
        }),
    );

    let outcome = rx.await.unwrap();
    assert_eq!(outcome, PollOutcome::TickCapReached);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(backend.status_calls.load(Ordering::SeqCst), 20);
    // implicit completion leaves the session in its last observed status
    assert_eq!(store.get("job-1").unwrap().status, SessionStatus::Running);
    assert!(!coordinator.is_active("job-1"));
}

#[tokio::test]
async fn polling_accumulates_comments_until_terminal_status() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store_with_session(&dir, "job-1");
    let backend = ScriptedBackend::new(
        vec![
            ("running", vec![
                raw_comment("src/lib.rs", 3, "first finding"),
                raw_comment("src/lib.rs", 8, "second finding"),
            ]),
            ("running", vec![]),
            ("completed", vec![raw_comment("src/lib.rs", 21, "late finding")]),
        ],
        "completed",
    );
    let coordinator = coordinator_for(backend, store.clone(), sink, fast_settings(100, 5));

    let completions = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();
    let counter = completions.clone();
    coordinator.start(
        "job-1".to_string(),
        Box::new(move |outcome| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(outcome);
        }),
    );

    assert_eq!(rx.await.unwrap(), PollOutcome::Completed);
    assert_eq!(completions.load(Ordering::SeqCst), 1);

    let session = store.get("job-1").unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.total_comments, 3);
    assert_eq!(session.total_comments, session.comment_count());
    let file = session.find_file("src/lib.rs").unwrap();
    assert_eq!(file.issue_count, file.critical_count + file.high_count);
}

#[tokio::test]
async fn stopping_mid_poll_drops_the_in_flight_response() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store_with_session(&dir, "job-1");
    let backend = ScriptedBackend::with_comment_delay(
        vec![("running", vec![raw_comment("src/lib.rs", 4, "should never land")])],
        Duration::from_millis(100),
    );
    let coordinator = coordinator_for(backend, store.clone(), sink, fast_settings(100, 5));

    let (tx, rx) = oneshot::channel();
    coordinator.start(
        "job-1".to_string(),
        Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }),
    );

    // let the first tick get its comment fetch in flight, then cancel
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(coordinator.stop("job-1"));
    // stopping again is a no-op
    assert!(!coordinator.stop("job-1"));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(store.get("job-1").unwrap().total_comments, 0);
    // a stopped job never reports completion
    assert!(rx.await.is_err());
}

#[tokio::test]
async fn restarting_a_job_replaces_the_previous_poller() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store_with_session(&dir, "job-1");

    let slow = ScriptedBackend::never_terminal();
    let coordinator = coordinator_for(slow, store.clone(), sink.clone(), fast_settings(1000, 5));

    let (first_tx, first_rx) = oneshot::channel();
    coordinator.start(
        "job-1".to_string(),
        Box::new(move |outcome| {
            let _ = first_tx.send(outcome);
        }),
    );

    tokio::time::sleep(Duration::from_millis(20)).await;

    let (second_tx, second_rx) = oneshot::channel();
    coordinator.start(
        "job-1".to_string(),
        Box::new(move |outcome| {
            let _ = second_tx.send(outcome);
        }),
    );

    // the first poller was cancelled without completing
    assert!(first_rx.await.is_err());
    coordinator.stop("job-1");
    assert!(second_rx.await.is_err());
    assert!(!coordinator.is_active("job-1"));
}

#[tokio::test]
async fn consecutive_fetch_errors_exhaust_polling() {
    let dir = TempDir::new().unwrap();
    let (store, sink) = store_with_session(&dir, "job-1");
    let backend = ScriptedBackend::failing();
    let coordinator = coordinator_for(backend.clone(), store.clone(), sink, fast_settings(100, 5));

    let (tx, rx) = oneshot::channel();
    coordinator.start(
        "job-1".to_string(),
        Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }),
    );

    assert_eq!(rx.await.unwrap(), PollOutcome::ErrorsExhausted);
    assert_eq!(backend.status_calls.load(Ordering::SeqCst), 5);
    // exhaustion does not force the session into Failed
    assert_eq!(store.get("job-1").unwrap().status, SessionStatus::Running);
}

#[tokio::test]
async fn restored_sessions_replay_comments_into_the_sink() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sessions.json");

    let original_history = {
        let sink = RecordingSink::new();
        let store = Arc::new(SessionStore::new(path.clone(), sink.clone()));
        store.create_session(
            SessionMeta {
                data_id: "job-9".to_string(),
                title: "persisted review".to_string(),
                branch: BranchRef { from: "work".to_string(), to: "main".to_string() },
            },
            &[change("src/lib.rs", "fn lib() {}")],
        );
        let ingestor = CommentIngestor::new(store.clone(), sink);
        ingestor.ingest("job-9", &raw_comment("src/lib.rs", 2, "first"));
        ingestor.ingest("job-9", &raw_comment("src/lib.rs", 6, "second"));
        store.history()
    };

    let sink = RecordingSink::new();
    let reloaded = SessionStore::new(path, sink.clone());
    let replayed = reloaded.restore().unwrap();

    assert_eq!(replayed, 2);
    assert_eq!(sink.count(), 2);
    assert_eq!(reloaded.history(), original_history);
    assert_eq!(reloaded.current_id().as_deref(), Some("job-9"));
}

#[tokio::test]
async fn submission_creates_a_session_with_reviewed_hashes() {
    let dir = TempDir::new().unwrap();
    let sink = RecordingSink::new();
    let store = Arc::new(SessionStore::new(dir.path().join("sessions.json"), sink.clone()));
    let provider: Arc<dyn ChangeProvider> = Arc::new(StubProvider {
        snapshots: vec![FileSnapshot::capture(
            "src/auth.rs".to_string(),
            FileStatus::Added,
            "fn login() {}\n".to_string(),
        )],
    });
    let backend: Arc<dyn ReviewBackend> = ScriptedBackend::new(Vec::new(), "running");
    let ingestor = Arc::new(CommentIngestor::new(store.clone(), sink));
    let resolver = ChangeSetResolver::new(provider.clone(), &[]);
    let orchestrator = ReviewOrchestrator::new(
        provider,
        backend,
        store.clone(),
        ingestor,
        resolver,
        "demo".to_string(),
        "/tmp/demo".to_string(),
        "main".to_string(),
    );

    let outcome = orchestrator.submit(None).await.unwrap();
    assert_eq!(
        outcome,
        ReviewOutcome::Submitted { data_id: "job-1".to_string(), files: 1, initial_comments: 0 }
    );

    let session = store.get("job-1").unwrap();
    assert_eq!(session.status, SessionStatus::Running);
    assert_eq!(
        session.find_file("src/auth.rs").unwrap().last_reviewed_hash,
        ContentHasher::hash("fn login() {}\n")
    );
    assert_eq!(store.current_id().as_deref(), Some("job-1"));
}

#[tokio::test]
async fn empty_scan_and_nothing_new_are_distinguished() {
    let dir = TempDir::new().unwrap();
    let sink = RecordingSink::new();
    let store = Arc::new(SessionStore::new(dir.path().join("sessions.json"), sink.clone()));
    let backend: Arc<dyn ReviewBackend> = ScriptedBackend::new(Vec::new(), "running");
    let ingestor = Arc::new(CommentIngestor::new(store.clone(), sink));

    // no changed files at all
    let empty_provider: Arc<dyn ChangeProvider> = Arc::new(StubProvider { snapshots: Vec::new() });
    let orchestrator = ReviewOrchestrator::new(
        empty_provider.clone(),
        backend.clone(),
        store.clone(),
        ingestor.clone(),
        ChangeSetResolver::new(empty_provider, &[]),
        "demo".to_string(),
        "/tmp/demo".to_string(),
        "main".to_string(),
    );
    assert_eq!(orchestrator.submit(None).await.unwrap(), ReviewOutcome::NoChanges);

    // changes exist but all hashes match the prior session
    store.create_session(
        SessionMeta {
            data_id: "old-job".to_string(),
            title: "prior".to_string(),
            branch: BranchRef::default(),
        },
        &[change("src/auth.rs", "fn login() {}\n")],
    );
    let provider: Arc<dyn ChangeProvider> = Arc::new(StubProvider {
        snapshots: vec![FileSnapshot::capture(
            "src/auth.rs".to_string(),
            FileStatus::Modified,
            "fn login() {}\n".to_string(),
        )],
    });
    let orchestrator = ReviewOrchestrator::new(
        provider.clone(),
        backend,
        store.clone(),
        ingestor,
        ChangeSetResolver::new(provider, &[]),
        "demo".to_string(),
        "/tmp/demo".to_string(),
        "main".to_string(),
    );
    assert_eq!(orchestrator.submit(None).await.unwrap(), ReviewOutcome::NothingNew);
}

struct NoDataIdBackend;

#[async_trait]
impl ReviewBackend for NoDataIdBackend {
    async fn submit_review(&self, _request: &ReviewRequest) -> RevlineResult<SubmitResponse> {
        Ok(SubmitResponse::default())
    }

    async fn fetch_status(&self, data_id: &str) -> RevlineResult<StatusResponse> {
        Ok(StatusResponse { analysis_status: "running".to_string(), data_id: data_id.to_string() })
    }

    async fn fetch_comments(&self, _data_id: &str) -> RevlineResult<CommentsResponse> {
        Ok(CommentsResponse::default())
    }

    async fn stop_analysis(&self, data_id: &str) -> RevlineResult<StatusResponse> {
        Ok(StatusResponse { analysis_status: "failed".to_string(), data_id: data_id.to_string() })
    }
}

#[tokio::test]
async fn missing_data_id_is_a_protocol_failure_without_a_session() {
    let dir = TempDir::new().unwrap();
    let sink = RecordingSink::new();
    let store = Arc::new(SessionStore::new(dir.path().join("sessions.json"), sink.clone()));
    let provider: Arc<dyn ChangeProvider> = Arc::new(StubProvider {
        snapshots: vec![FileSnapshot::capture(
            "src/auth.rs".to_string(),
            FileStatus::Added,
            "fn login() {}\n".to_string(),
        )],
    });
    let ingestor = Arc::new(CommentIngestor::new(store.clone(), sink));
    let orchestrator = ReviewOrchestrator::new(
        provider.clone(),
        Arc::new(NoDataIdBackend),
        store.clone(),
        ingestor,
        ChangeSetResolver::new(provider, &[]),
        "demo".to_string(),
        "/tmp/demo".to_string(),
        "main".to_string(),
    );

    let error = orchestrator.submit(None).await.unwrap_err();
    assert!(matches!(error, RevlineError::ProtocolError { .. }));
    assert!(store.is_empty());
}

#[test]
fn oversized_wire_fields_travel_compressed() {
    let big_patch = "+let value = compute();\n".repeat(100);
    let entry = FileEntry::from_change(&ResolvedChange {
        path: "src/big.rs".to_string(),
        status: FileStatus::Modified,
        patch: big_patch.clone(),
        additions: 100,
        deletions: 0,
        content: "small".to_string(),
    });

    assert!(entry.patch.is_none());
    assert_eq!(entry.compressed, Some(true));
    assert_eq!(entry.content.as_deref(), Some("small"));
    assert!(entry.content_compressed.is_none());

    let restored = compression::unpack_field(None, entry.patch_compressed.as_deref()).unwrap();
    assert_eq!(restored.as_deref(), Some(big_patch.as_str()));
}
