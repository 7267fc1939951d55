//! The list query descriptor as explicit state: a pure reducer plus a small
//! context that hands out immutable snapshots.

use std::sync::Arc;

use client_core::Settings;
use shared::query::{FilterValue, ListQueryDescriptor, SortOrder, DEFAULT_PAGE_SIZE};
use tracing::debug;

/// Per-view defaults that `ClearFilters` and URL fallbacks return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub limit: u32,
}

impl QueryDefaults {
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.default_page_size)
    }

    pub fn descriptor(&self) -> ListQueryDescriptor {
        ListQueryDescriptor::with_limit(self.limit)
    }
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryAction {
    SetPage(u32),
    SetLimit(u32),
    SetSort { field: String, order: SortOrder },
    SetSearch(Option<String>),
    /// `None` or an unset value removes the filter.
    SetFilter {
        key: String,
        value: Option<FilterValue>,
    },
    ClearFilters,
}

impl QueryAction {
    pub fn sort(field: impl Into<String>) -> Self {
        QueryAction::SetSort {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn filter(key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        QueryAction::SetFilter {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn remove_filter(key: impl Into<String>) -> Self {
        QueryAction::SetFilter {
            key: key.into(),
            value: None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            QueryAction::SetPage(_) => "set_page",
            QueryAction::SetLimit(_) => "set_limit",
            QueryAction::SetSort { .. } => "set_sort",
            QueryAction::SetSearch(_) => "set_search",
            QueryAction::SetFilter { .. } => "set_filter",
            QueryAction::ClearFilters => "clear_filters",
        }
    }
}

/// Applies one action. Everything except `SetPage` puts the view back on
/// page 1.
pub fn reduce(
    current: &ListQueryDescriptor,
    action: QueryAction,
    defaults: &QueryDefaults,
) -> ListQueryDescriptor {
    let mut next = current.clone();
    match action {
        QueryAction::SetPage(page) => {
            next.page = page.max(1);
            return next;
        }
        QueryAction::SetLimit(limit) => next.limit = limit.max(1),
        QueryAction::SetSort { field, order } => {
            next.sort = Some(field).filter(|field| !field.is_empty());
            next.order = order;
        }
        QueryAction::SetSearch(text) => next.search = text.filter(|text| !text.is_empty()),
        QueryAction::SetFilter { key, value } => match value.filter(|value| !value.is_unset()) {
            Some(value) => {
                next.filters.insert(key, value);
            }
            None => {
                next.filters.remove(&key);
            }
        },
        QueryAction::ClearFilters => return defaults.descriptor(),
    }
    next.page = 1;
    next
}

/// Owns the descriptor for one list view. Each dispatch swaps in a fresh
/// snapshot; `revision` moves only when the value actually changed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    defaults: QueryDefaults,
    current: Arc<ListQueryDescriptor>,
    revision: u64,
}

impl QueryContext {
    pub fn new(defaults: QueryDefaults) -> Self {
        Self::with_descriptor(defaults, defaults.descriptor())
    }

    pub fn with_descriptor(defaults: QueryDefaults, descriptor: ListQueryDescriptor) -> Self {
        Self {
            defaults,
            current: Arc::new(descriptor),
            revision: 0,
        }
    }

    pub fn defaults(&self) -> QueryDefaults {
        self.defaults
    }

    pub fn descriptor(&self) -> Arc<ListQueryDescriptor> {
        Arc::clone(&self.current)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns whether the descriptor changed.
    pub fn dispatch(&mut self, action: QueryAction) -> bool {
        let name = action.name();
        let next = reduce(&self.current, action, &self.defaults);
        let changed = self.replace(next);
        debug!(action = name, changed, revision = self.revision, "query action");
        changed
    }

    /// Installs a descriptor from outside, e.g. after back/forward navigation.
    pub fn replace(&mut self, descriptor: ListQueryDescriptor) -> bool {
        let changed = *self.current != descriptor;
        self.current = Arc::new(descriptor);
        if changed {
            self.revision += 1;
        }
        changed
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        self.dispatch(QueryAction::SetPage(page))
    }

    pub fn set_limit(&mut self, limit: u32) -> bool {
        self.dispatch(QueryAction::SetLimit(limit))
    }

    pub fn set_sort(&mut self, field: impl Into<String>, order: Option<SortOrder>) -> bool {
        self.dispatch(QueryAction::SetSort {
            field: field.into(),
            order: order.unwrap_or_default(),
        })
    }

    pub fn set_search(&mut self, text: Option<String>) -> bool {
        self.dispatch(QueryAction::SetSearch(text))
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: Option<FilterValue>) -> bool {
        self.dispatch(QueryAction::SetFilter {
            key: key.into(),
            value,
        })
    }

    pub fn clear_filters(&mut self) -> bool {
        self.dispatch(QueryAction::ClearFilters)
    }
}

#[cfg(test)]
#[path = "tests/query_state_tests.rs"]
mod tests;
