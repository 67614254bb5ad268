use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use crate::errors::{RevlineError, RevlineResult};
use crate::structs::api::comments_response::CommentsResponse;
use crate::structs::api::review_request::ReviewRequest;
use crate::structs::api::status_response::StatusResponse;
use crate::structs::api::submit_response::SubmitResponse;
use crate::structs::config::server_config::ServerConfig;
use crate::traits::review_backend::ReviewBackend;

/// HTTP implementation of the review service contract.
pub struct ReviewClient {
    base_url: String,
    client: Client,
    api_token: Option<String>,
}

impl ReviewClient {
    pub fn new(config: &ServerConfig) -> RevlineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let api_token = std::env::var(&config.api_token_env).ok();
        if api_token.is_none() {
            log::debug!("No API token in ${}; requests go unauthenticated", config.api_token_env);
        }
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            api_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(operation: &str, url: &str, response: Response) -> RevlineResult<Response> {
        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(RevlineError::network_error(
                operation,
                Some(url),
                Some(status_code),
                &body,
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl ReviewBackend for ReviewClient {
    async fn submit_review(&self, request: &ReviewRequest) -> RevlineResult<SubmitResponse> {
        let url = self.endpoint("/extension/review");
        let response = self.authorize(self.client.post(&url)).json(request).send().await?;
        let response = Self::check_status("review submission", &url, response).await?;
        Ok(response.json::<SubmitResponse>().await?)
    }

    async fn fetch_status(&self, data_id: &str) -> RevlineResult<StatusResponse> {
        let url = self.endpoint(&format!("/extension/status/{}", data_id));
        let response = self.authorize(self.client.get(&url)).send().await?;
        let response = Self::check_status("status fetch", &url, response).await?;
        Ok(response.json::<StatusResponse>().await?)
    }

    async fn fetch_comments(&self, data_id: &str) -> RevlineResult<CommentsResponse> {
        let url = self.endpoint(&format!("/extension/comments/{}", data_id));
        let response = self.authorize(self.client.get(&url)).send().await?;
        let response = Self::check_status("comment fetch", &url, response).await?;
        Ok(response.json::<CommentsResponse>().await?)
    }

    async fn stop_analysis(&self, data_id: &str) -> RevlineResult<StatusResponse> {
        let url = self.endpoint(&format!("/extension/stop/{}", data_id));
        let response = self.authorize(self.client.post(&url)).send().await?;
        let response = Self::check_status("analysis stop", &url, response).await?;
        Ok(response.json::<StatusResponse>().await?)
    }
}
