//! Turns descriptor changes into list calls and keeps the last good page on
//! screen. Every call carries a sequence number; only the newest one issued
//! may write its result into the view.

use client_core::{ClientError, RecordKindClient};
use shared::{
    domain::{CatalogRecord, RecordId},
    protocol::ListResult,
    query::{ListQuery, ListQueryDescriptor},
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListViewState {
    pub items: Vec<CatalogRecord>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<ClientError>,
}

/// A list call handed out by [`ListFetchController::submit`]; the caller
/// runs `query` and reports back with `seq`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFetch {
    pub seq: u64,
    pub query: ListQuery,
}

/// `ceil(total / limit)`.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    total.div_ceil(u64::from(limit.max(1)))
}

#[derive(Debug, Default)]
pub struct ListFetchController {
    state: ListViewState,
    last_seq: u64,
    outstanding: Option<u64>,
    last_descriptor: Option<ListQueryDescriptor>,
}

impl ListFetchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ListViewState {
        &self.state
    }

    pub fn items(&self) -> &[CatalogRecord] {
        &self.state.items
    }

    pub fn total(&self) -> u64 {
        self.state.total
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.state.error.as_ref()
    }

    pub fn item_ids(&self) -> Vec<RecordId> {
        self.state.items.iter().map(|item| item.id.clone()).collect()
    }

    /// Descriptor of the most recent submission.
    pub fn descriptor(&self) -> Option<&ListQueryDescriptor> {
        self.last_descriptor.as_ref()
    }

    pub fn total_pages(&self) -> u64 {
        let limit = self
            .last_descriptor
            .as_ref()
            .map_or(shared::query::DEFAULT_PAGE_SIZE, |descriptor| descriptor.limit);
        total_pages(self.state.total, limit)
    }

    /// Starts a call for `descriptor`. Any call still in flight becomes stale.
    pub fn submit(&mut self, descriptor: &ListQueryDescriptor) -> PendingFetch {
        self.last_seq += 1;
        if let Some(previous) = self.outstanding.replace(self.last_seq) {
            debug!(superseded = previous, seq = self.last_seq, "list fetch superseded");
        }
        self.state.loading = true;
        self.last_descriptor = Some(descriptor.clone());
        let query = descriptor.to_list_query();
        debug!(seq = self.last_seq, page = descriptor.page, limit = descriptor.limit, "list fetch submitted");
        PendingFetch {
            seq: self.last_seq,
            query,
        }
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.outstanding == Some(seq)
    }

    /// Applies the result of call `seq`. Returns false when a newer call has
    /// been submitted since, in which case the result is dropped.
    pub fn complete(
        &mut self,
        seq: u64,
        result: Result<ListResult<CatalogRecord>, ClientError>,
    ) -> bool {
        if !self.is_current(seq) {
            debug!(seq, newest = self.last_seq, "dropping stale list response");
            return false;
        }
        self.outstanding = None;
        self.state.loading = false;
        match result {
            Ok(page) => {
                self.state.items = page.items;
                self.state.total = page.total;
                self.state.error = None;
            }
            Err(err) => {
                warn!(seq, error = %err, "list fetch failed; keeping previous items");
                self.state.error = Some(err);
            }
        }
        true
    }

    /// Submits, awaits `client.list` and applies the result.
    pub async fn fetch(
        &mut self,
        client: &dyn RecordKindClient,
        descriptor: &ListQueryDescriptor,
    ) -> bool {
        let pending = self.submit(descriptor);
        let result = client.list(&pending.query).await;
        self.complete(pending.seq, result)
    }

    /// Reissues the last submitted query. Does nothing before the first fetch.
    pub async fn refetch(&mut self, client: &dyn RecordKindClient) -> bool {
        let Some(descriptor) = self.last_descriptor.clone() else {
            return false;
        };
        self.fetch(client, &descriptor).await
    }
}

#[cfg(test)]
#[path = "tests/list_fetch_tests.rs"]
mod tests;
