/// Sink for rendered review comments. In an editor this would drive inline
/// comment threads and gutter markers; the CLI renders through the logger.
pub trait CommentSink: Send + Sync {
    fn render_comment(&self, file_path: &str, line: u32, body: &str);

    fn clear_all(&self);
}
