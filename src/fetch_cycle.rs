// src/fetch_cycle.rs

use std::sync::Arc;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::models::TaskListResult;
use crate::query_params::QueryParams;
use crate::task_service::ServiceError;

/// Where the task list is in its current fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Idle,
    Loading,
    Success(Arc<TaskListResult>),
    Failure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Failure,
}

impl FetchState {
    pub fn status(&self) -> FetchStatus {
        match self {
            FetchState::Idle => FetchStatus::Idle,
            FetchState::Loading => FetchStatus::Loading,
            FetchState::Success(_) => FetchStatus::Success,
            FetchState::Failure(_) => FetchStatus::Failure,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failure(message) => Some(message),
            _ => None,
        }
    }
}

/// Outcome of handing a response to [`FetchCycle::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer request was started after this one; the response was dropped.
    Stale,
}

/// The fetch state machine plus the request generation guard.
///
/// Every request gets the next generation number. Only the response of the
/// latest generation may change the state, whatever order responses arrive in.
#[derive(Debug)]
pub struct FetchCycle {
    generation: u64,
    state: FetchState,
    last_result: Option<Arc<TaskListResult>>,
}

impl Default for FetchCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchCycle {
    pub fn new() -> Self {
        FetchCycle {
            generation: 0,
            state: FetchState::Idle,
            last_result: None,
        }
    }

    /// Enter `Loading` and return the generation of the new request.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = FetchState::Loading;
        self.generation
    }

    pub fn resolve(
        &mut self,
        generation: u64,
        outcome: Result<TaskListResult, ServiceError>,
    ) -> Resolution {
        if generation != self.generation {
            debug!(
                "Dropping task list response of generation {} (latest is {})",
                generation, self.generation
            );
            return Resolution::Stale;
        }

        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                self.last_result = Some(result.clone());
                self.state = FetchState::Success(result);
            }
            Err(e) => {
                error!("Error fetching tasks: {}", e);
                // last_result stays: the list keeps showing the previous page
                self.state = FetchState::Failure(e.failure_message());
            }
        }
        Resolution::Applied
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// The most recent successful result, kept across failed refreshes.
    pub fn last_result(&self) -> Option<&Arc<TaskListResult>> {
        self.last_result.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self, params: &QueryParams) -> TaskListSnapshot {
        TaskListSnapshot {
            params: params.clone(),
            status: self.state.status(),
            loading: self.state == FetchState::Loading,
            data: self.last_result.clone(),
            error: self.state.error().map(str::to_string),
            has_active_filters: params.has_active_filters(),
            generation: self.generation,
        }
    }
}

/// What the task list page renders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskListSnapshot {
    pub params: QueryParams,
    pub status: FetchStatus,
    pub loading: bool,
    pub data: Option<Arc<TaskListResult>>,
    pub error: Option<String>,
    pub has_active_filters: bool,
    pub generation: u64,
}
