use std::env;

use thiserror::Error;

use crate::query_params::{QueryPatch, SortOrder};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    pub bind_address: String,
    pub frontend_origin: String,
    /// Overrides for the task list's default params; also what "clear filters" returns to.
    pub initial_params: QueryPatch,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let request_timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => parse(&raw, "REQUEST_TIMEOUT_SECS")?,
            None => 30,
        };

        let mut initial_params = QueryPatch::new();
        if let Some(raw) = get("TASKS_PER_PAGE") {
            let per_page: u32 = parse(&raw, "TASKS_PER_PAGE")?;
            if per_page == 0 {
                return Err(ConfigError::Invalid {
                    key: "TASKS_PER_PAGE",
                    value: raw,
                });
            }
            initial_params = initial_params.per_page(per_page);
        }
        if let Some(sort_by) = get("TASKS_SORT_BY") {
            initial_params = initial_params.sort_by(sort_by);
        }
        if let Some(raw) = get("TASKS_SORT_ORDER") {
            let order: SortOrder = parse(&raw, "TASKS_SORT_ORDER")?;
            initial_params = initial_params.sort_order(order);
        }

        Ok(Self {
            api_base_url: get("TASKS_API_URL").ok_or(ConfigError::Missing("TASKS_API_URL"))?,
            api_token: get("TASKS_API_TOKEN"),
            request_timeout_secs,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            frontend_origin: get("FRONTEND_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            initial_params,
        })
    }
}

fn parse<T: std::str::FromStr>(raw: &str, key: &'static str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_api_url_is_set() {
        let config = Config::from_lookup(lookup(&[("TASKS_API_URL", "http://api.local/api")])).unwrap();

        assert_eq!(config.api_base_url, "http://api.local/api");
        assert_eq!(config.api_token, None);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.frontend_origin, "http://localhost:3000");
        assert!(config.initial_params.is_empty());
    }

    #[test]
    fn initial_params_come_from_the_environment() {
        let config = Config::from_lookup(lookup(&[
            ("TASKS_API_URL", "http://api.local"),
            ("TASKS_API_TOKEN", "t0ken"),
            ("TASKS_PER_PAGE", "25"),
            ("TASKS_SORT_BY", "due_date"),
            ("TASKS_SORT_ORDER", "asc"),
        ]))
        .unwrap();

        assert_eq!(config.api_token.as_deref(), Some("t0ken"));
        assert_eq!(
            config.initial_params,
            QueryPatch::new()
                .per_page(25)
                .sort_by("due_date")
                .sort_order(SortOrder::Asc)
        );
    }

    #[test]
    fn missing_api_url_is_an_error() {
        let err = Config::from_lookup(lookup(&[("TASKS_API_URL", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TASKS_API_URL"));
        assert_eq!(err.to_string(), "TASKS_API_URL must be set");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("TASKS_API_URL", "http://api.local"),
            ("TASKS_PER_PAGE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TASKS_PER_PAGE", .. }));

        let err = Config::from_lookup(lookup(&[
            ("TASKS_API_URL", "http://api.local"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "REQUEST_TIMEOUT_SECS", .. }));
    }
}
