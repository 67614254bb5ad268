use std::sync::Arc;
use crate::errors::{RevlineError, RevlineResult};
use crate::services::change_set_resolver::ChangeSetResolver;
use crate::services::comment_ingestor::{CommentIngestor, IngestOutcome};
use crate::services::session_store::{SessionMeta, SessionStore};
use crate::structs::api::review_request::{ChangeSummary, ChangesPayload, FileEntry, RepositoryMeta, ReviewRequest};
use crate::structs::resolved_change::ResolvedChange;
use crate::structs::session::branch_ref::BranchRef;
use crate::traits::change_provider::ChangeProvider;
use crate::traits::review_backend::ReviewBackend;

/// What a submission attempt amounted to. `NoChanges` and `NothingNew` are
/// distinct so the caller can message the user correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    NoChanges,
    NothingNew,
    Submitted {
        data_id: String,
        files: usize,
        initial_comments: usize,
    },
}

/// Wires scan, resolution, submission and session creation together.
/// Polling is started by the caller once a submission is accepted.
pub struct ReviewOrchestrator {
    provider: Arc<dyn ChangeProvider>,
    backend: Arc<dyn ReviewBackend>,
    store: Arc<SessionStore>,
    ingestor: Arc<CommentIngestor>,
    resolver: ChangeSetResolver,
    repo_name: String,
    workspace_path: String,
    base_branch: String,
}

impl ReviewOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn ChangeProvider>,
        backend: Arc<dyn ReviewBackend>,
        store: Arc<SessionStore>,
        ingestor: Arc<CommentIngestor>,
        resolver: ChangeSetResolver,
        repo_name: String,
        workspace_path: String,
        base_branch: String,
    ) -> Self {
        Self {
            provider,
            backend,
            store,
            ingestor,
            resolver,
            repo_name,
            workspace_path,
            base_branch,
        }
    }

    pub async fn submit(&self, explicit_filter: Option<Vec<String>>) -> RevlineResult<ReviewOutcome> {
        let snapshots = self.provider.list_changed_files().await?;
        if snapshots.is_empty() {
            return Ok(ReviewOutcome::NoChanges);
        }

        let history = self.store.history();
        let changes = self
            .resolver
            .resolve(&snapshots, &history, explicit_filter.as_deref())
            .await;
        if changes.is_empty() {
            return Ok(ReviewOutcome::NothingNew);
        }

        let branch = self.provider.branch_ref(&self.base_branch).await?;
        let request = build_request(&self.repo_name, &self.workspace_path, branch.clone(), &changes);
        log::info!(
            "📤 Submitting {} file(s) for review ({} additions, {} deletions)",
            request.changes.summary.files,
            request.changes.summary.additions,
            request.changes.summary.deletions
        );

        let response = self.backend.submit_review(&request).await?;
        let data_id = response
            .extension_data_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                RevlineError::protocol_error("/extension/review", "response carried no extension_data_id")
            })?;

        let title = format!("{} ({} files)", branch.from, changes.len());
        let session = self.store.create_session(
            SessionMeta { data_id: data_id.clone(), title, branch },
            &changes,
        );
        log::info!("🆕 Review session {} created", session.data_id);

        let mut initial_comments = 0;
        for raw in &response.comments {
            if self.ingestor.ingest(&session.data_id, raw) == IngestOutcome::Applied {
                initial_comments += 1;
            }
        }

        Ok(ReviewOutcome::Submitted {
            data_id,
            files: changes.len(),
            initial_comments,
        })
    }
}

fn build_request(
    repo_name: &str,
    workspace_path: &str,
    branch: BranchRef,
    changes: &[ResolvedChange],
) -> ReviewRequest {
    let additions = changes.iter().map(|c| c.additions).sum();
    let deletions = changes.iter().map(|c| c.deletions).sum();
    let full_diff = changes
        .iter()
        .map(|c| c.patch.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    ReviewRequest {
        repository: RepositoryMeta {
            name: repo_name.to_string(),
            path: workspace_path.to_string(),
        },
        branch,
        changes: ChangesPayload {
            summary: ChangeSummary {
                files: changes.len() as u32,
                additions,
                deletions,
            },
            commits: Vec::new(),
            files: changes.iter().map(FileEntry::from_change).collect(),
            full_diff,
        },
    }
}
