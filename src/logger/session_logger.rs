use crate::structs::session::comment::Comment;
use crate::structs::session::review_session::ReviewSession;

pub struct SessionLogger;

impl SessionLogger {
    pub fn print_sessions(sessions: &[ReviewSession], current: Option<&str>) {
        log::info!("\n📋 Review Sessions:");
        log::info!("{}", "=".repeat(60));

        if sessions.is_empty() {
            log::info!("⚠️ No review sessions stored for this workspace.");
            log::info!("💡 Run 'revline review' to submit one.");
            return;
        }

        for (i, session) in sessions.iter().enumerate() {
            let marker = if Some(session.data_id.as_str()) == current { "👉" } else { "  " };
            log::info!(
                "{} {}. {} {} [{}]",
                marker,
                i + 1,
                session.status.glyph(),
                session.title,
                session.data_id
            );
            log::info!(
                "      🌿 {} → {}  💬 {} comments ({} resolved)  🕒 {}",
                session.branch.from,
                session.branch.to,
                session.total_comments,
                session.resolved_comments,
                session.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }

        log::info!("\n📊 Total sessions: {}", sessions.len());
    }

    pub fn print_session(session: &ReviewSession) {
        log::info!("\n{}", "=".repeat(60));
        log::info!("📊 {} {} [{}]", session.status.glyph(), session.title, session.data_id);
        log::info!("{}", "=".repeat(60));
        log::info!(
            "🌿 {} → {}  💬 {} comments, {} resolved",
            session.branch.from,
            session.branch.to,
            session.total_comments,
            session.resolved_comments
        );

        for file in &session.files {
            if file.comments.is_empty() {
                continue;
            }
            log::info!(
                "\n📄 {} ({} comments, {} issues)",
                file.file_path,
                file.comments.len(),
                file.issue_count
            );
            for comment in &file.comments {
                Self::print_comment(comment);
            }
        }

        if session.total_comments == 0 {
            log::info!("\n✨ No comments were raised for this review.");
        }
    }

    pub fn print_comment(comment: &Comment) {
        let resolved = if comment.resolved { " ✔ resolved" } else { "" };
        log::info!(
            "   {} L{}-{} [{}] {}{}",
            comment.severity.glyph(),
            comment.line_start,
            comment.line_end,
            comment.id,
            comment.title,
            resolved
        );
    }
}
