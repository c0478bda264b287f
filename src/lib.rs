//! Task list state for the Taskline dashboard: query params, fetching
//! against the task API, and the HTTP surface the dashboard UI talks to.

pub mod app_state;
pub mod config;
pub mod controller;
pub mod fetch_cycle;
pub mod models;
pub mod navigation;
pub mod param_store;
pub mod query_params;
pub mod task_list;
pub mod task_service;

#[cfg(test)]
mod testing;
