//! One list page: query state, fenced fetching, selection and bulk toolbar
//! bookkeeping wired to a single record-kind client.

use std::sync::Arc;

use client_core::{ClientError, RecordKindClient};
use serde_json::Value;
use shared::{
    domain::{CatalogRecord, RecordId, RecordKind},
    protocol::{AuditedDeleteRequest, BulkAction, ListResult},
    query::ListQueryDescriptor,
};
use tracing::debug;
use url::Url;

use crate::{
    events::{ErrorContext, ViewError},
    list_fetch::{ListFetchController, PendingFetch},
    mutation::MutationTracker,
    query_state::{QueryAction, QueryContext, QueryDefaults},
    selection::{SelectionPolicy, SelectionSet},
    url_sync,
};

pub struct ListView {
    client: Arc<dyn RecordKindClient>,
    query: QueryContext,
    fetch: ListFetchController,
    selection: SelectionSet,
    selection_policy: SelectionPolicy,
    mutation: MutationTracker,
    fetched_revision: Option<u64>,
}

impl ListView {
    pub fn new(client: Arc<dyn RecordKindClient>, defaults: QueryDefaults) -> Self {
        Self::with_descriptor(client, defaults, defaults.descriptor())
    }

    /// Mounts the view on the state carried by a navigable URL.
    pub fn from_url(client: Arc<dyn RecordKindClient>, defaults: QueryDefaults, url: &Url) -> Self {
        let descriptor = url_sync::descriptor_from_url(url, &defaults);
        Self::with_descriptor(client, defaults, descriptor)
    }

    pub fn with_descriptor(
        client: Arc<dyn RecordKindClient>,
        defaults: QueryDefaults,
        descriptor: ListQueryDescriptor,
    ) -> Self {
        Self {
            client,
            query: QueryContext::with_descriptor(defaults, descriptor),
            fetch: ListFetchController::new(),
            selection: SelectionSet::new(),
            selection_policy: SelectionPolicy::default(),
            mutation: MutationTracker::new(),
            fetched_revision: None,
        }
    }

    pub fn with_selection_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selection_policy = policy;
        self
    }

    pub fn kind(&self) -> RecordKind {
        self.client.kind()
    }

    pub fn client(&self) -> Arc<dyn RecordKindClient> {
        Arc::clone(&self.client)
    }

    pub fn query(&self) -> &QueryContext {
        &self.query
    }

    pub fn fetch_state(&self) -> &ListFetchController {
        &self.fetch
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionSet {
        &mut self.selection
    }

    pub fn mutation(&self) -> &MutationTracker {
        &self.mutation
    }

    /// Banner-ready form of the last list failure.
    pub fn list_error(&self) -> Option<ViewError> {
        self.fetch
            .error()
            .map(|err| ViewError::from_client(ErrorContext::ListFetch, err))
    }

    pub fn mutation_error(&self) -> Option<ViewError> {
        self.mutation.view_error()
    }

    pub fn total_pages(&self) -> u64 {
        crate::list_fetch::total_pages(self.fetch.total(), self.query.descriptor().limit)
    }

    /// Applies a query action. Returns whether the descriptor changed, i.e.
    /// whether a fetch is now due.
    pub fn dispatch(&mut self, action: QueryAction) -> bool {
        let changed = self.query.dispatch(action);
        if changed && self.selection_policy == SelectionPolicy::ClearOnQueryChange {
            self.selection.clear();
        }
        changed
    }

    /// Back/forward navigation: adopt the descriptor the URL now carries.
    pub fn sync_from_url(&mut self, url: &Url) -> bool {
        let descriptor = url_sync::descriptor_from_url(url, &self.query.defaults());
        let changed = self.query.replace(descriptor);
        if changed && self.selection_policy == SelectionPolicy::ClearOnQueryChange {
            self.selection.clear();
        }
        changed
    }

    pub fn write_url(&self, url: &mut Url) {
        url_sync::write_descriptor(url, &self.query.descriptor());
    }

    pub fn needs_fetch(&self) -> bool {
        self.fetched_revision != Some(self.query.revision())
    }

    /// Submits a fetch for the current descriptor, for callers that run the
    /// call elsewhere (see [`crate::FetchBridge`]).
    pub fn begin_fetch(&mut self) -> PendingFetch {
        self.fetched_revision = Some(self.query.revision());
        self.fetch.submit(&self.query.descriptor())
    }

    pub fn complete_fetch(
        &mut self,
        seq: u64,
        result: Result<ListResult<CatalogRecord>, ClientError>,
    ) -> bool {
        self.fetch.complete(seq, result)
    }

    pub fn fetch_mut(&mut self) -> &mut ListFetchController {
        &mut self.fetch
    }

    /// Fetches the current descriptor if it changed since the last fetch.
    pub async fn load(&mut self) -> bool {
        if !self.needs_fetch() {
            return false;
        }
        self.refetch().await
    }

    pub async fn refetch(&mut self) -> bool {
        self.fetched_revision = Some(self.query.revision());
        let descriptor = self.query.descriptor();
        self.fetch.fetch(self.client.as_ref(), &descriptor).await
    }

    /// Header checkbox: select the visible page, or clear when it is
    /// already fully selected.
    pub fn toggle_all_visible(&mut self) {
        let visible = self.fetch.item_ids();
        if self.selection.is_all_selected(&visible) {
            self.selection.clear();
        } else {
            self.selection.select_all(visible);
        }
    }

    pub async fn delete(
        &mut self,
        id: &RecordId,
        audit: Option<&AuditedDeleteRequest>,
    ) -> Result<(), ClientError> {
        self.mutation
            .delete_record(self.client.as_ref(), id, audit)
            .await?;
        self.selection.deselect(id);
        self.refetch().await;
        Ok(())
    }

    /// Runs `action` over the current selection as one call. Clears the
    /// selection and reloads on success, except for exports. An empty
    /// selection issues no call and yields `Value::Null`.
    pub async fn bulk(&mut self, action: BulkAction) -> Result<Value, ClientError> {
        if self.selection.is_empty() {
            debug!(kind = %self.kind(), %action, "bulk action skipped, nothing selected");
            return Ok(Value::Null);
        }
        let ids = self.selection.ids();
        let reload = action != BulkAction::Export;
        let response = self
            .mutation
            .bulk(self.client.as_ref(), action, &ids)
            .await?;
        if reload {
            self.selection.clear();
            self.refetch().await;
        }
        Ok(response)
    }
}

#[cfg(test)]
#[path = "tests/list_view_tests.rs"]
mod tests;
