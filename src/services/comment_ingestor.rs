use std::sync::Arc;
use chrono::Utc;
use crate::errors::{RevlineError, RevlineResult};
use crate::services::comment_parser;
use crate::services::session_store::SessionStore;
use crate::structs::api::raw_comment::RawComment;
use crate::structs::session::comment::Comment;
use crate::traits::comment_sink::CommentSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Applied,
    Duplicate,
    Quarantined,
    SessionMissing,
}

/// Folds raw comment payloads into the owning session's file groups,
/// keeping the aggregate counts consistent. Every applied comment triggers
/// store persistence and a notification to the rendering sink.
pub struct CommentIngestor {
    store: Arc<SessionStore>,
    sink: Arc<dyn CommentSink>,
}

impl CommentIngestor {
    pub fn new(store: Arc<SessionStore>, sink: Arc<dyn CommentSink>) -> Self {
        Self { store, sink }
    }

    pub fn ingest(&self, data_id: &str, raw: &RawComment) -> IngestOutcome {
        let metadata = comment_parser::parse_metadata(&raw.content);

        let file_path = if !raw.file_path.trim().is_empty() {
            raw.file_path.trim().to_string()
        } else if let Some(file) = metadata.file.clone() {
            file
        } else {
            log::error!("🗑️ Quarantined comment without a file path (job {})", data_id);
            return IngestOutcome::Quarantined;
        };

        let severity = metadata
            .severity
            .unwrap_or_else(|| comment_parser::severity_heuristic(&raw.content));
        let title = raw
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or(metadata.title)
            .unwrap_or_else(|| comment_parser::fallback_title(&raw.content));
        let line_start = if raw.line_start > 0 {
            raw.line_start
        } else {
            metadata.line_start.unwrap_or(1)
        };
        let line_end = raw.line_end.max(line_start);

        let comment = Comment {
            id: Comment::synthesize_id(data_id),
            file_path: file_path.clone(),
            line_start,
            line_end,
            severity,
            title: title.clone(),
            confidence: raw.confidence,
            content: raw.content.clone(),
            created_at: Utc::now(),
            resolved: false,
        };

        let applied = self.store.with_session_mut(data_id, |session| {
            // the comments endpoint may be cumulative; dedupe by identity
            let duplicate = session.files.iter().any(|file| {
                file.comments.iter().any(|existing| {
                    existing.file_path == comment.file_path
                        && existing.line_start == comment.line_start
                        && existing.title == comment.title
                })
            });
            if duplicate {
                return false;
            }
            let group = session.file_group_mut(&file_path);
            group.record_severity(severity);
            group.comments.push(comment.clone());
            session.total_comments += 1;
            true
        });

        match applied {
            None => {
                log::error!("⚠️ No session found for job {}; dropping comment for {}", data_id, file_path);
                IngestOutcome::SessionMissing
            }
            Some(false) => {
                log::debug!("Skipping duplicate comment {}:{} ({})", file_path, line_start, title);
                IngestOutcome::Duplicate
            }
            Some(true) => {
                self.sink.render_comment(
                    &file_path,
                    line_start,
                    &format!("{} {}", severity.glyph(), title),
                );
                IngestOutcome::Applied
            }
        }
    }

    /// Marking is idempotent: a comment already resolved does not count a
    /// second time. Ok(false) means the comment was already resolved or was
    /// not found in the session.
    pub fn mark_resolved(&self, data_id: &str, comment_id: &str) -> RevlineResult<bool> {
        let result = self.store.with_session_mut(data_id, |session| {
            for file in &mut session.files {
                if let Some(comment) = file.comments.iter_mut().find(|c| c.id == comment_id) {
                    if comment.resolved {
                        return Some(false);
                    }
                    comment.resolved = true;
                    session.resolved_comments += 1;
                    return Some(true);
                }
            }
            None
        });

        match result {
            None => Err(RevlineError::session_not_found(data_id)),
            Some(None) => {
                log::error!("⚠️ Comment {} not found in session {}", comment_id, data_id);
                Ok(false)
            }
            Some(Some(changed)) => Ok(changed),
        }
    }
}
