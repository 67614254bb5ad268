use std::path::PathBuf;
use async_trait::async_trait;
use futures::future::join_all;
use tokio::process::Command;
use crate::enums::file_status::FileStatus;
use crate::errors::{RevlineError, RevlineResult};
use crate::structs::file_snapshot::FileSnapshot;
use crate::structs::session::branch_ref::BranchRef;
use crate::traits::change_provider::ChangeProvider;

/// Default `ChangeProvider` backed by the git CLI.
pub struct GitChangeProvider {
    repo_path: PathBuf,
}

impl GitChangeProvider {
    pub fn new(repo_path: PathBuf) -> Self {
        Self { repo_path }
    }

    async fn run_git(&self, args: &[&str]) -> RevlineResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .await
            .map_err(|e| RevlineError::git_error(&args.join(" "), &e.to_string()))?;

        if !output.status.success() {
            return Err(RevlineError::git_error(
                &args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn snapshot_for(&self, status: FileStatus, path: String) -> FileSnapshot {
        let content = if status == FileStatus::Deleted {
            String::new()
        } else {
            match tokio::fs::read_to_string(self.repo_path.join(&path)).await {
                Ok(content) => content,
                Err(e) => {
                    // unreadable (binary, permissions): sentinel content,
                    // the file still shows up as changed
                    log::error!("⚠️ Could not read {}: {}", path, e);
                    String::new()
                }
            }
        };
        FileSnapshot::capture(path, status, content)
    }
}

/// One `git status --porcelain` line into a status and path.
pub fn parse_porcelain_line(line: &str) -> Option<(FileStatus, String)> {
    if line.len() < 4 {
        return None;
    }
    let (code, rest) = line.split_at(3);
    let mut path = rest.trim().to_string();
    if let Some((_, renamed)) = path.split_once(" -> ") {
        path = renamed.trim().to_string();
    }
    path = path.trim_matches('"').to_string();
    if path.is_empty() {
        return None;
    }

    let code = &code[..2];
    let status = if code == "??" {
        FileStatus::Added
    } else if code.contains('D') {
        FileStatus::Deleted
    } else if code.contains('A') {
        FileStatus::Added
    } else {
        FileStatus::Modified
    };
    Some((status, path))
}

#[async_trait]
impl ChangeProvider for GitChangeProvider {
    async fn list_changed_files(&self) -> RevlineResult<Vec<FileSnapshot>> {
        let output = self.run_git(&["status", "--porcelain", "-uall"]).await?;

        let captures = output
            .lines()
            .filter_map(parse_porcelain_line)
            .map(|(status, path)| self.snapshot_for(status, path));
        Ok(join_all(captures).await)
    }

    async fn baseline_content(&self, path: &str) -> RevlineResult<Option<String>> {
        // a failing `git show` means the baseline has no such file
        match self.run_git(&["show", &format!("HEAD:{}", path)]).await {
            Ok(content) => Ok(Some(content)),
            Err(_) => Ok(None),
        }
    }

    async fn branch_ref(&self, base: &str) -> RevlineResult<BranchRef> {
        let from = match self.run_git(&["rev-parse", "--abbrev-ref", "HEAD"]).await {
            Ok(branch) => branch.trim().to_string(),
            Err(e) => {
                log::error!("⚠️ Could not resolve current branch: {}", e);
                "HEAD".to_string()
            }
        };
        Ok(BranchRef { from, to: base.to_string() })
    }
}
