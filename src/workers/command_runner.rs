use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use crate::config::config_manager::ConfigManager;
use crate::enums::commands::Commands;
use crate::enums::poll_outcome::PollOutcome;
use crate::enums::session_status::SessionStatus;
use crate::errors::{RevlineError, RevlineResult};
use crate::logger::animated_logger::AnimatedLogger;
use crate::logger::inline_renderer::InlineRenderer;
use crate::logger::session_logger::SessionLogger;
use crate::services::change_set_resolver::ChangeSetResolver;
use crate::services::comment_ingestor::CommentIngestor;
use crate::services::git_change_provider::GitChangeProvider;
use crate::services::polling_coordinator::{PollSettings, PollingCoordinator};
use crate::services::review_client::ReviewClient;
use crate::services::review_orchestrator::{ReviewOrchestrator, ReviewOutcome};
use crate::services::session_store::SessionStore;
use crate::structs::config::config::Config;
use crate::traits::change_provider::ChangeProvider;
use crate::traits::comment_sink::CommentSink;
use crate::traits::review_backend::ReviewBackend;

struct Stack {
    config: Config,
    workspace: PathBuf,
    store: Arc<SessionStore>,
    sink: Arc<dyn CommentSink>,
    backend: Arc<dyn ReviewBackend>,
    ingestor: Arc<CommentIngestor>,
}

pub struct CommandRunner {
    start_time: Option<Instant>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self { start_time: None }
    }

    pub async fn run_command(&mut self, command: Commands) -> RevlineResult<()> {
        self.start_time = Some(Instant::now());

        let result = match command {
            Commands::Init => self.init_command().await,
            Commands::Review { file } => self.review_command(file).await,
            Commands::Sessions => self.sessions_command().await,
            Commands::Show { data_id } => self.show_command(data_id).await,
            Commands::Delete { data_id } => self.delete_command(data_id).await,
            Commands::Stop { data_id } => self.stop_command(data_id).await,
            Commands::Resolve { data_id, comment_id } => self.resolve_command(data_id, comment_id).await,
        };

        if let Some(start) = self.start_time {
            let duration = start.elapsed();
            log::info!("⏱️  Command completed in {:.2}s", duration.as_secs_f64());
        }

        result
    }

    fn build_stack(&self) -> RevlineResult<Stack> {
        let config = ConfigManager::load()?;
        ConfigManager::validate_config(&config)?;

        let workspace = std::env::current_dir()?;
        let sink: Arc<dyn CommentSink> = Arc::new(InlineRenderer);
        let state_dir = config.storage.state_dir.as_ref().map(PathBuf::from);
        let store = Arc::new(SessionStore::open(&workspace, state_dir, sink.clone())?);
        let backend: Arc<dyn ReviewBackend> = Arc::new(ReviewClient::new(&config.server)?);
        let ingestor = Arc::new(CommentIngestor::new(store.clone(), sink.clone()));

        Ok(Stack {
            config,
            workspace,
            store,
            sink,
            backend,
            ingestor,
        })
    }

    async fn init_command(&self) -> RevlineResult<()> {
        log::info!("🚀 Initializing revline configuration...");

        match ConfigManager::create_sample_config() {
            Ok(_) => {
                log::info!("✅ Configuration file created successfully!");
                log::info!("📝 Edit the configuration file to point at your review service.");
            }
            Err(e) => {
                log::error!("❌ Failed to create configuration: {}", e);
                return Err(e);
            }
        }

        Ok(())
    }

    async fn review_command(&self, files: Vec<String>) -> RevlineResult<()> {
        let stack = self.build_stack()?;

        let repo_name = stack
            .workspace
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "workspace".to_string());
        let provider: Arc<dyn ChangeProvider> = Arc::new(GitChangeProvider::new(stack.workspace.clone()));
        let resolver = ChangeSetResolver::new(provider.clone(), &stack.config.review.exclude_extensions);
        let orchestrator = ReviewOrchestrator::new(
            provider,
            stack.backend.clone(),
            stack.store.clone(),
            stack.ingestor.clone(),
            resolver,
            repo_name,
            stack.workspace.to_string_lossy().to_string(),
            stack.config.review.base_branch.clone(),
        );

        let explicit_filter = if files.is_empty() { None } else { Some(files) };

        let mut logger = AnimatedLogger::new("Collecting changed files");
        logger.start();

        let outcome = match orchestrator.submit(explicit_filter).await {
            Ok(outcome) => outcome,
            Err(e) => {
                logger.error("Review submission failed").await;
                return Err(e);
            }
        };

        match outcome {
            ReviewOutcome::NoChanges => {
                logger.stop("Working tree is clean").await;
                log::info!("⚠️ No changed files found - nothing to review.");
            }
            ReviewOutcome::NothingNew => {
                logger.stop("Everything is already reviewed").await;
                log::info!("✨ Changes exist, but nothing is new since the last review.");
            }
            ReviewOutcome::Submitted { data_id, files, initial_comments } => {
                if initial_comments > 0 {
                    log::info!("💬 {} comment(s) arrived with the submission", initial_comments);
                }
                logger.set_message(format!("Waiting for remote analysis of {} file(s)", files));

                let coordinator = PollingCoordinator::new(
                    stack.backend.clone(),
                    stack.ingestor.clone(),
                    stack.store.clone(),
                    PollSettings::from_config(&stack.config.polling),
                );
                let (completion_tx, completion_rx) = oneshot::channel();
                coordinator.start(
                    data_id.clone(),
                    Box::new(move |outcome| {
                        let _ = completion_tx.send(outcome);
                    }),
                );

                match completion_rx.await {
                    Ok(PollOutcome::Completed) => logger.stop("Analysis complete").await,
                    Ok(PollOutcome::Failed) => logger.error("Remote analysis failed").await,
                    Ok(PollOutcome::TickCapReached) => {
                        logger.stop("Stopped waiting - the service did not finish in time").await
                    }
                    Ok(PollOutcome::ErrorsExhausted) => {
                        logger.error("Gave up after repeated fetch errors").await
                    }
                    Err(_) => logger.error("Polling ended unexpectedly").await,
                }

                if let Some(session) = stack.store.get(&data_id) {
                    SessionLogger::print_session(&session);
                }
            }
        }

        Ok(())
    }

    async fn sessions_command(&self) -> RevlineResult<()> {
        let stack = self.build_stack()?;
        let sessions = stack.store.history();
        let current = stack.store.current_id();
        SessionLogger::print_sessions(&sessions, current.as_deref());
        Ok(())
    }

    async fn show_command(&self, data_id: Option<String>) -> RevlineResult<()> {
        let stack = self.build_stack()?;
        let session = match &data_id {
            Some(id) => stack.store.get(id),
            None => stack.store.current(),
        };
        match session {
            Some(session) => SessionLogger::print_session(&session),
            None => {
                let wanted = data_id.unwrap_or_else(|| "current".to_string());
                return Err(RevlineError::session_not_found(&wanted));
            }
        }
        Ok(())
    }

    async fn delete_command(&self, data_id: String) -> RevlineResult<()> {
        let stack = self.build_stack()?;
        if stack.store.delete(&data_id) {
            log::info!("🗑️ Deleted review session {}", data_id);
            match stack.store.current_id() {
                Some(current) => log::info!("👉 Current session is now {}", current),
                None => {
                    stack.sink.clear_all();
                    log::info!("📭 No review sessions remain");
                }
            }
            Ok(())
        } else {
            Err(RevlineError::session_not_found(&data_id))
        }
    }

    async fn stop_command(&self, data_id: String) -> RevlineResult<()> {
        let stack = self.build_stack()?;
        if stack.store.get(&data_id).is_none() {
            return Err(RevlineError::session_not_found(&data_id));
        }

        log::info!("🛑 Stopping analysis for job {}...", data_id);
        if let Err(e) = stack.backend.stop_analysis(&data_id).await {
            // the session is still marked interrupted locally
            log::error!("⚠️ Stop request to the review service failed: {}", e);
        }
        stack.store.set_status(&data_id, SessionStatus::Interrupted);
        log::info!("⏸️ Session {} marked as interrupted", data_id);
        Ok(())
    }

    async fn resolve_command(&self, data_id: String, comment_id: String) -> RevlineResult<()> {
        let stack = self.build_stack()?;
        if stack.ingestor.mark_resolved(&data_id, &comment_id)? {
            let session = stack.store.get(&data_id);
            let resolved = session.map(|s| s.resolved_comments).unwrap_or_default();
            log::info!("✅ Comment resolved ({} resolved in session {})", resolved, data_id);
        } else {
            log::info!("⚠️ Comment was already resolved or not found; nothing changed.");
        }
        Ok(())
    }
}
