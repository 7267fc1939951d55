use std::future::Future;

use client_core::{apply_update, ClientError, RecordKindClient};
use serde_json::{Map, Value};
use shared::{
    domain::{CatalogRecord, RecordId},
    protocol::{AuditedDeleteRequest, BulkAction, Mutation},
};
use tracing::{info, warn};

use crate::events::{ErrorContext, ViewError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationState {
    pub loading: bool,
    pub error: Option<ClientError>,
}

/// Loading/error bookkeeping around one write at a time. Failures are
/// recorded and also handed back to the caller.
#[derive(Debug, Default)]
pub struct MutationTracker {
    state: MutationState,
    context: ErrorContext,
}

impl MutationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.state.error.as_ref()
    }

    /// The last failure, phrased for the kind of write that produced it.
    pub fn view_error(&self) -> Option<ViewError> {
        self.state
            .error
            .as_ref()
            .map(|err| ViewError::from_client(self.context, err))
    }

    pub fn begin(&mut self) {
        self.state.loading = true;
        self.state.error = None;
    }

    pub fn finish<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        self.state.loading = false;
        if let Err(err) = &result {
            self.state.error = Some(err.clone());
        }
        result
    }

    pub async fn run<T, F>(&mut self, label: &str, call: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.run_in(ErrorContext::Mutation, label, call).await
    }

    async fn run_in<T, F>(
        &mut self,
        context: ErrorContext,
        label: &str,
        call: F,
    ) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.context = context;
        self.begin();
        let result = call.await;
        match &result {
            Ok(_) => info!(mutation = label, "mutation succeeded"),
            Err(err) => warn!(mutation = label, error = %err, "mutation failed"),
        }
        self.finish(result)
    }

    pub async fn delete_record(
        &mut self,
        client: &dyn RecordKindClient,
        id: &RecordId,
        audit: Option<&AuditedDeleteRequest>,
    ) -> Result<(), ClientError> {
        self.run("delete", client.delete(id, audit)).await
    }

    /// One call for the whole batch; there is no per-id outcome.
    pub async fn bulk(
        &mut self,
        client: &dyn RecordKindClient,
        action: BulkAction,
        ids: &[RecordId],
    ) -> Result<Value, ClientError> {
        let label = format!("bulk-{action}");
        self.run_in(ErrorContext::BulkAction, &label, client.bulk_action(action, ids))
            .await
    }

    pub async fn bulk_delete(
        &mut self,
        client: &dyn RecordKindClient,
        ids: &[RecordId],
    ) -> Result<Value, ClientError> {
        self.bulk(client, BulkAction::Delete, ids).await
    }

    pub async fn mutate(
        &mut self,
        client: &dyn RecordKindClient,
        id: &RecordId,
        mutation: &Mutation,
    ) -> Result<CatalogRecord, ClientError> {
        let context = match mutation {
            Mutation::FieldEdit(_) => ErrorContext::Mutation,
            Mutation::Command(_) => ErrorContext::Command,
        };
        self.run_in(context, mutation.label(), client.mutate(id, mutation))
            .await
    }

    pub async fn create(
        &mut self,
        client: &dyn RecordKindClient,
        data: &Map<String, Value>,
    ) -> Result<CatalogRecord, ClientError> {
        self.run("create", client.create(data)).await
    }

    /// Form submission: plans and applies the edit as commands and field edits.
    pub async fn save_form(
        &mut self,
        client: &dyn RecordKindClient,
        id: &RecordId,
        original: &Map<String, Value>,
        current: &Map<String, Value>,
    ) -> Result<Map<String, Value>, ClientError> {
        self.run("save-form", apply_update(client, id, original, current))
            .await
    }
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
