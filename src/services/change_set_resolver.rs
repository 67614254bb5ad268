use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use once_cell::sync::Lazy;
use crate::config::constants::EXCLUDED_FILE_EXTENSIONS;
use crate::enums::file_status::FileStatus;
use crate::services::diff_computer::DiffComputer;
use crate::structs::file_snapshot::FileSnapshot;
use crate::structs::resolved_change::ResolvedChange;
use crate::structs::session::review_session::ReviewSession;
use crate::structs::session::reviewed_file::ReviewedFile;
use crate::traits::change_provider::ChangeProvider;

static EXCLUDED_EXTENSIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| EXCLUDED_FILE_EXTENSIONS.iter().copied().collect());

/// Decides which of the currently changed files still need review, and what
/// patch or content to submit for each. Result ordering is not guaranteed.
pub struct ChangeSetResolver {
    provider: Arc<dyn ChangeProvider>,
    extra_excluded: HashSet<String>,
}

impl ChangeSetResolver {
    pub fn new(provider: Arc<dyn ChangeProvider>, extra_excluded: &[String]) -> Self {
        Self {
            provider,
            extra_excluded: extra_excluded.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// An empty result means nothing NEW since the last review; callers
    /// distinguish that from an empty scan for correct user messaging.
    pub async fn resolve(
        &self,
        snapshots: &[FileSnapshot],
        history: &[ReviewSession],
        explicit_filter: Option<&[String]>,
    ) -> Vec<ResolvedChange> {
        // last occurrence wins when the scan repeats a path
        let mut by_path: HashMap<String, ResolvedChange> = HashMap::new();

        for snapshot in snapshots {
            if let Some(change) = self.resolve_snapshot(snapshot, history).await {
                by_path.insert(change.path.clone(), change);
            }
        }

        let mut changes: Vec<ResolvedChange> = by_path
            .into_values()
            .filter(|change| !self.is_excluded(&change.path))
            .collect();

        if let Some(filter) = explicit_filter {
            let allowed: HashSet<&str> = filter.iter().map(String::as_str).collect();
            changes.retain(|change| allowed.contains(change.path.as_str()));
        }

        changes
    }

    async fn resolve_snapshot(
        &self,
        snapshot: &FileSnapshot,
        history: &[ReviewSession],
    ) -> Option<ResolvedChange> {
        if let Some(record) = find_last_reviewed(history, &snapshot.path) {
            if !record.last_reviewed_hash.is_empty()
                && record.last_reviewed_hash == snapshot.content_hash
            {
                // unchanged since some past session reviewed it
                return None;
            }
            let patch = DiffComputer::diff(
                &snapshot.path,
                Some(record.last_reviewed_content.as_str()),
                &snapshot.content,
            );
            if patch.is_empty() {
                // identical effective content despite a hash mismatch;
                // conservative guard, nothing useful to submit
                return None;
            }
            let (additions, deletions) = DiffComputer::count_changes(&patch);
            return Some(ResolvedChange {
                path: snapshot.path.clone(),
                status: snapshot.status,
                patch,
                additions,
                deletions,
                content: snapshot.content.clone(),
            });
        }

        if snapshot.status == FileStatus::Added {
            if snapshot.content.is_empty() {
                return None;
            }
            let additions = snapshot.content.lines().count() as u32;
            return Some(ResolvedChange {
                path: snapshot.path.clone(),
                status: snapshot.status,
                patch: snapshot.content.clone(),
                additions,
                deletions: 0,
                content: snapshot.content.clone(),
            });
        }

        let baseline = match self.provider.baseline_content(&snapshot.path).await {
            Ok(baseline) => baseline,
            Err(e) => {
                log::error!("⚠️ Could not read committed baseline for {}: {}", snapshot.path, e);
                None
            }
        };
        let patch = DiffComputer::diff(&snapshot.path, baseline.as_deref(), &snapshot.content);
        if patch.is_empty() {
            return None;
        }
        let (additions, deletions) = DiffComputer::count_changes(&patch);
        Some(ResolvedChange {
            path: snapshot.path.clone(),
            status: snapshot.status,
            patch,
            additions,
            deletions,
            content: snapshot.content.clone(),
        })
    }

    fn is_excluded(&self, path: &str) -> bool {
        let Some(extension) = Path::new(path).extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let extension = extension.to_lowercase();
        EXCLUDED_EXTENSIONS.contains(extension.as_str()) || self.extra_excluded.contains(&extension)
    }
}

/// Most recent session first; history is stored newest-first.
fn find_last_reviewed<'a>(history: &'a [ReviewSession], path: &str) -> Option<&'a ReviewedFile> {
    history
        .iter()
        .find_map(|session| session.files.iter().find(|f| f.file_path == path))
}
