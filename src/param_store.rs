// src/param_store.rs

use crate::query_params::{QueryParams, QueryPatch};

/// Emitted by every mutation of the store. Whoever owns the store decides
/// whether and when a fetch follows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a parameter change should be handed to the fetch scheduler"]
pub struct ParamsChanged(pub QueryParams);

/// Holds the current query parameters and the baseline they were
/// initialized with.
#[derive(Debug, Clone)]
pub struct ParamStore {
    baseline: QueryParams,
    current: QueryParams,
}

impl ParamStore {
    pub fn new(initial: &QueryPatch) -> Self {
        let baseline = QueryParams::with_overrides(initial);
        ParamStore {
            current: baseline.clone(),
            baseline,
        }
    }

    pub fn current(&self) -> &QueryParams {
        &self.current
    }

    pub fn baseline(&self) -> &QueryParams {
        &self.baseline
    }

    pub fn update(&mut self, patch: &QueryPatch) -> ParamsChanged {
        self.current.apply(patch);
        self.changed()
    }

    pub fn go_to_page(&mut self, page: u32) -> ParamsChanged {
        self.update(&QueryPatch::new().page(page))
    }

    /// Back to the baseline, dropping every filter, sort and paging change.
    pub fn clear(&mut self) -> ParamsChanged {
        self.current = self.baseline.clone();
        self.changed()
    }

    pub fn toggle_sort(&mut self, column: &str) -> ParamsChanged {
        self.current.toggle_sort(column);
        self.changed()
    }

    fn changed(&self) -> ParamsChanged {
        ParamsChanged(self.current.clone())
    }
}
