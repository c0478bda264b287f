// src/task_service.rs

use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use log::debug;
use reqwest::{header, Client};
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;
use crate::models::TaskListResult;
use crate::query_params::QueryParams;

/// Shown when the API answers `success: false` without a message.
pub const REJECTED_FALLBACK: &str = "Failed to fetch tasks";
/// Shown when the request itself failed and nothing better is known.
pub const TRANSPORT_FALLBACK: &str = "An error occurred while fetching tasks";

/// Errors that can occur while querying the task list.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The API answered, but flagged the request as failed.
    #[error("{}", .message.as_deref().unwrap_or(REJECTED_FALLBACK))]
    Rejected { message: Option<String> },

    /// Non-2xx response.
    #[error("API error: {status}")]
    Status { status: u16, message: Option<String> },

    /// Client construction or body decoding failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request never got an HTTP response (connect, timeout, reset).
    #[error("transport error: {}", .message.as_deref().unwrap_or("unknown"))]
    Transport { message: Option<String> },

    /// `success: true` without a `data` block.
    #[error("response did not include task data")]
    MissingData,
}

impl ServiceError {
    /// The text the task list shows for this failure.
    pub fn failure_message(&self) -> String {
        match self {
            ServiceError::Rejected { message } => non_blank(message)
                .unwrap_or(REJECTED_FALLBACK)
                .to_string(),
            ServiceError::Status { message, .. } | ServiceError::Transport { message } => {
                non_blank(message).unwrap_or(TRANSPORT_FALLBACK).to_string()
            }
            ServiceError::Http(e) => e.to_string(),
            ServiceError::MissingData => TRANSPORT_FALLBACK.to_string(),
        }
    }
}

fn non_blank(message: &Option<String>) -> Option<&str> {
    message.as_deref().filter(|m| !m.trim().is_empty())
}

/// Response body of the task list endpoint. Error bodies share the shape,
/// usually with only `message` filled in.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<TaskListResult>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiEnvelope {
    pub fn into_result(self) -> Result<TaskListResult, ServiceError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ServiceError::MissingData),
            (false, _) => Err(ServiceError::Rejected {
                message: self.message,
            }),
        }
    }
}

pub type QueryFuture = LocalBoxFuture<'static, Result<TaskListResult, ServiceError>>;

/// The remote task list query. Implementations are stateless: one call,
/// one request, no retries.
pub trait TaskQueryService {
    fn query(&self, params: QueryParams) -> QueryFuture;
}

/// Queries `GET {base_url}/tasks` over HTTP.
#[derive(Clone)]
pub struct HttpTaskQueryService {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpTaskQueryService {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Self::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url.trim_end_matches('/'))
    }

    pub async fn fetch_page(&self, params: &QueryParams) -> Result<TaskListResult, ServiceError> {
        let url = self.tasks_url();
        debug!("GET {} page={} per_page={}", url, params.page, params.per_page);

        let mut request = self
            .client
            .get(&url)
            .query(params)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            debug!("Task API unreachable: {}", e);
            ServiceError::Transport {
                message: Some(e.to_string()),
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiEnvelope>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<ApiEnvelope>().await?.into_result()
    }
}

impl TaskQueryService for HttpTaskQueryService {
    fn query(&self, params: QueryParams) -> QueryFuture {
        let service = self.clone();
        async move { service.fetch_page(&params).await }.boxed_local()
    }
}
