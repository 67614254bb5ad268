pub mod animated_logger;
pub mod inline_renderer;
pub mod session_logger;
