// src/query_params.rs

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::models::{TaskPriority, TaskStatus, UnknownVariant};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 15;
pub const DEFAULT_SORT_BY: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(UnknownVariant {
                kind: "sort order",
                value: other.to_string(),
            }),
        }
    }
}

/// The filter, sort and pagination state of the task list.
///
/// Unset filters are `None`, never an empty string, and are left out of the
/// query string sent to the task API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub page: u32,
    pub per_page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl Default for QueryParams {
    fn default() -> Self {
        QueryParams {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            status: None,
            priority: None,
            project_id: None,
            assigned_to: None,
            search: None,
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_order: SortOrder::default(),
        }
    }
}

impl QueryParams {
    /// Hardcoded defaults with the caller's initial overrides on top.
    pub fn with_overrides(initial: &QueryPatch) -> Self {
        let mut params = QueryParams::default();
        params.merge(initial);
        params
    }

    /// Plain shallow merge, no pagination rules.
    pub fn merge(&mut self, patch: &QueryPatch) {
        if let Some(page) = patch.page {
            self.page = page;
        }
        if let Some(per_page) = patch.per_page {
            self.per_page = per_page;
        }
        if let Some(status) = &patch.status {
            self.status = *status;
        }
        if let Some(priority) = &patch.priority {
            self.priority = *priority;
        }
        if let Some(project_id) = &patch.project_id {
            self.project_id = *project_id;
        }
        if let Some(assigned_to) = &patch.assigned_to {
            self.assigned_to = *assigned_to;
        }
        if let Some(search) = &patch.search {
            self.search = search.clone().filter(|s| !s.is_empty());
        }
        if let Some(sort_by) = &patch.sort_by {
            self.sort_by = sort_by.clone();
        }
        if let Some(sort_order) = patch.sort_order {
            self.sort_order = sort_order;
        }
    }

    /// Merge a patch coming from the UI. Setting status, priority or search
    /// always moves back to the first page, even if the patch names a page.
    pub fn apply(&mut self, patch: &QueryPatch) {
        self.merge(patch);
        if patch.sets_filter() {
            self.page = DEFAULT_PAGE;
        }
    }

    pub fn has_active_filters(&self) -> bool {
        self.status.is_some()
            || self.priority.is_some()
            || self.project_id.is_some()
            || self.assigned_to.is_some()
            || self.search.is_some()
    }

    /// Column header click: same column flips the order, a new column starts ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.sort_by == column {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_by = column.to_string();
            self.sort_order = SortOrder::Asc;
        }
    }
}

/// A partial update of [`QueryParams`].
///
/// Filter fields are tri-state: `None` leaves the current value alone,
/// `Some(None)` clears it, `Some(Some(v))` sets it. In JSON, a missing key
/// leaves the field, `null` or `""` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<TaskStatus>>,
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<TaskPriority>>,
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<u64>>,
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<u64>>,
    #[serde(default, deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub search: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl QueryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(Some(status));
        self
    }

    pub fn clear_status(mut self) -> Self {
        self.status = Some(None);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(Some(priority));
        self
    }

    pub fn clear_priority(mut self) -> Self {
        self.priority = Some(None);
        self
    }

    pub fn project_id(mut self, project_id: u64) -> Self {
        self.project_id = Some(Some(project_id));
        self
    }

    pub fn clear_project_id(mut self) -> Self {
        self.project_id = Some(None);
        self
    }

    pub fn assigned_to(mut self, user_id: u64) -> Self {
        self.assigned_to = Some(Some(user_id));
        self
    }

    pub fn clear_assigned_to(mut self) -> Self {
        self.assigned_to = Some(None);
        self
    }

    /// An empty string clears the search, like the search box being emptied.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = Some(if text.is_empty() { None } else { Some(text) });
        self
    }

    pub fn clear_search(mut self) -> Self {
        self.search = Some(None);
        self
    }

    pub fn sort_by(mut self, column: impl Into<String>) -> Self {
        self.sort_by = Some(column.into());
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// True when the patch sets status, priority or search to a non-empty value.
    /// Clearing one of them does not count.
    pub fn sets_filter(&self) -> bool {
        matches!(self.status, Some(Some(_)))
            || matches!(self.priority, Some(Some(_)))
            || matches!(&self.search, Some(Some(text)) if !text.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        *self == QueryPatch::default()
    }
}

/// Scalar as sent by a browser form or echoed by the API: numbers sometimes
/// arrive as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Number(u64),
}

fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = match Option::<RawValue>::deserialize(deserializer)? {
        None => return Ok(Some(None)),
        Some(RawValue::Text(text)) => text,
        Some(RawValue::Number(n)) => n.to_string(),
    };
    if raw.is_empty() {
        return Ok(Some(None));
    }
    raw.parse::<T>()
        .map(|value| Some(Some(value)))
        .map_err(de::Error::custom)
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    clearable(deserializer).map(Option::flatten)
}
