use async_trait::async_trait;
use crate::errors::RevlineResult;
use crate::structs::api::comments_response::CommentsResponse;
use crate::structs::api::review_request::ReviewRequest;
use crate::structs::api::status_response::StatusResponse;
use crate::structs::api::submit_response::SubmitResponse;

/// The review service endpoints the engine depends on. The HTTP client
/// implements this; tests drive the engine with scripted implementations.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    async fn submit_review(&self, request: &ReviewRequest) -> RevlineResult<SubmitResponse>;

    async fn fetch_status(&self, data_id: &str) -> RevlineResult<StatusResponse>;

    async fn fetch_comments(&self, data_id: &str) -> RevlineResult<CommentsResponse>;

    async fn stop_analysis(&self, data_id: &str) -> RevlineResult<StatusResponse>;
}
