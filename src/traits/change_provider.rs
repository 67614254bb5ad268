use async_trait::async_trait;
use crate::errors::RevlineResult;
use crate::structs::file_snapshot::FileSnapshot;
use crate::structs::session::branch_ref::BranchRef;

/// Capability over the host's source control: what changed in the working
/// tree, what a file looked like at the committed baseline, and which
/// branches a submission spans.
#[async_trait]
pub trait ChangeProvider: Send + Sync {
    async fn list_changed_files(&self) -> RevlineResult<Vec<FileSnapshot>>;

    /// Content of the file at the last committed baseline, or None when the
    /// baseline has no such file.
    async fn baseline_content(&self, path: &str) -> RevlineResult<Option<String>>;

    async fn branch_ref(&self, base: &str) -> RevlineResult<BranchRef>;
}
