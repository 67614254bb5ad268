use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use crate::config::constants::{CONFIG_DIR_NAME, STATE_DIR_NAME, STATE_FILE_NAME};
use crate::enums::session_status::SessionStatus;
use crate::errors::RevlineResult;
use crate::services::content_hasher::ContentHasher;
use crate::structs::resolved_change::ResolvedChange;
use crate::structs::session::branch_ref::BranchRef;
use crate::structs::session::review_session::ReviewSession;
use crate::traits::comment_sink::CommentSink;

pub struct SessionMeta {
    pub data_id: String,
    pub title: String,
    pub branch: BranchRef,
}

#[derive(Default)]
struct StoreState {
    /// Insertion order, newest first.
    sessions: Vec<ReviewSession>,
    current: Option<String>,
}

/// The one piece of state shared across resolver, ingestor, coordinator and
/// persistence. All session mutation funnels through these methods; the
/// store re-persists after every mutation and replays stored comments into
/// the rendering sink on restore.
pub struct SessionStore {
    state: RwLock<StoreState>,
    storage_path: PathBuf,
    sink: Arc<dyn CommentSink>,
}

impl SessionStore {
    pub fn new(storage_path: PathBuf, sink: Arc<dyn CommentSink>) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            storage_path,
            sink,
        }
    }

    /// Opens the per-workspace store and restores any persisted sessions.
    pub fn open(
        workspace_root: &Path,
        state_dir_override: Option<PathBuf>,
        sink: Arc<dyn CommentSink>,
    ) -> RevlineResult<Self> {
        let base = match state_dir_override {
            Some(dir) => dir,
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(CONFIG_DIR_NAME)
                .join(STATE_DIR_NAME),
        };
        let key = ContentHasher::workspace_key(&workspace_root.to_string_lossy());
        let storage_path = base.join(key).join(STATE_FILE_NAME);

        let store = Self::new(storage_path, sink);
        let restored = store.restore()?;
        if restored > 0 {
            log::info!("📂 Restored {} review comment(s) from previous sessions", restored);
        }
        Ok(store)
    }

    pub fn create_session(&self, meta: SessionMeta, changes: &[ResolvedChange]) -> ReviewSession {
        let session = ReviewSession::new(meta.data_id, meta.title, meta.branch, changes);
        {
            let mut state = self.write_state();
            // dataId is unique across the store
            state.sessions.retain(|s| s.data_id != session.data_id);
            state.sessions.insert(0, session.clone());
            state.current = Some(session.data_id.clone());
        }
        self.persist_or_log();
        session
    }

    /// Replaces the session with a matching dataId, or inserts the session
    /// at the front as the newest (and current) one.
    pub fn upsert(&self, session: ReviewSession) {
        {
            let mut state = self.write_state();
            match state.sessions.iter().position(|s| s.data_id == session.data_id) {
                Some(index) => state.sessions[index] = session,
                None => {
                    state.current = Some(session.data_id.clone());
                    state.sessions.insert(0, session);
                }
            }
        }
        self.persist_or_log();
    }

    pub fn delete(&self, data_id: &str) -> bool {
        let removed = {
            let mut state = self.write_state();
            let before = state.sessions.len();
            state.sessions.retain(|s| s.data_id != data_id);
            let removed = state.sessions.len() != before;
            // correct a dangling current pointer
            let current_is_valid = state
                .current
                .as_ref()
                .map(|id| state.sessions.iter().any(|s| &s.data_id == id))
                .unwrap_or(false);
            if !current_is_valid {
                state.current = state.sessions.first().map(|s| s.data_id.clone());
            }
            removed
        };
        if removed {
            self.persist_or_log();
        }
        removed
    }

    pub fn set_current(&self, data_id: Option<&str>) -> bool {
        let mut state = self.write_state();
        match data_id {
            None => {
                state.current = None;
                true
            }
            Some(id) => {
                if state.sessions.iter().any(|s| s.data_id == id) {
                    state.current = Some(id.to_string());
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn current(&self) -> Option<ReviewSession> {
        let state = self.read_state();
        let id = state.current.clone()?;
        state.sessions.iter().find(|s| s.data_id == id).cloned()
    }

    pub fn current_id(&self) -> Option<String> {
        self.read_state().current.clone()
    }

    pub fn get(&self, data_id: &str) -> Option<ReviewSession> {
        self.read_state()
            .sessions
            .iter()
            .find(|s| s.data_id == data_id)
            .cloned()
    }

    /// All sessions, newest first. This is the history the resolver searches.
    pub fn history(&self) -> Vec<ReviewSession> {
        self.read_state().sessions.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().sessions.is_empty()
    }

    pub fn set_status(&self, data_id: &str, status: SessionStatus) -> bool {
        self.with_session_mut(data_id, |session| session.status = status)
            .is_some()
    }

    /// Runs a closure against the matching session and persists afterwards.
    /// Returns None when no session has the given dataId.
    pub fn with_session_mut<R>(
        &self,
        data_id: &str,
        mutate: impl FnOnce(&mut ReviewSession) -> R,
    ) -> Option<R> {
        let result = {
            let mut state = self.write_state();
            state
                .sessions
                .iter_mut()
                .find(|s| s.data_id == data_id)
                .map(mutate)
        };
        if result.is_some() {
            self.persist_or_log();
        }
        result
    }

    /// Serializes the full session array to the workspace state file.
    pub fn persist(&self) -> RevlineResult<()> {
        let json = {
            let state = self.read_state();
            serde_json::to_string_pretty(&state.sessions)?
        };
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.storage_path, json)?;
        Ok(())
    }

    /// Reloads the session array verbatim and replays every stored comment
    /// into the rendering sink so inline markers reappear after a restart.
    /// Returns the number of comments replayed. An unreadable state file is
    /// logged and treated as an empty store; the file is left for inspection.
    pub fn restore(&self) -> RevlineResult<usize> {
        if !self.storage_path.exists() {
            return Ok(0);
        }
        let content = fs::read_to_string(&self.storage_path)?;
        let sessions: Vec<ReviewSession> = match serde_json::from_str(&content) {
            Ok(sessions) => sessions,
            Err(e) => {
                log::error!(
                    "⚠️ Stored sessions at {} are unreadable, starting empty: {}",
                    self.storage_path.display(),
                    e
                );
                return Ok(0);
            }
        };

        let mut replayed = 0;
        for session in &sessions {
            for file in &session.files {
                for comment in &file.comments {
                    self.sink.render_comment(
                        &comment.file_path,
                        comment.line_start,
                        &format!("{} {}", comment.severity.glyph(), comment.title),
                    );
                    replayed += 1;
                }
            }
        }

        let mut state = self.write_state();
        state.current = sessions.first().map(|s| s.data_id.clone());
        state.sessions = sessions;
        Ok(replayed)
    }

    fn persist_or_log(&self) {
        if let Err(e) = self.persist() {
            log::error!("⚠️ Failed to persist sessions to {}: {}", self.storage_path.display(), e);
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
