use crate::traits::comment_sink::CommentSink;

/// CLI stand-in for the editor's inline comment threads: rendered comments
/// become gutter-style log lines.
pub struct InlineRenderer;

impl CommentSink for InlineRenderer {
    fn render_comment(&self, file_path: &str, line: u32, body: &str) {
        log::info!("💬 {}:{} {}", file_path, line, body);
    }

    fn clear_all(&self) {
        log::info!("🧹 Cleared inline review comments");
    }
}
