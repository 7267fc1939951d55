use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::{
    domain::{CatalogRecord, RecordId, RecordKind},
    protocol::{AuditedDeleteRequest, BulkAction, BulkActionRequest, CommandInvocation, ListResult, Mutation},
    query::ListQuery,
};
use tracing::{debug, info};
use url::{form_urlencoded, Url};

use crate::{
    commands::{spec_for, CommandSpec, ReasonPolicy, RecordKindSpec},
    error::ClientError,
    query_codec,
    transport::{Transport, TransportRequest},
};

/// The CRUD + command surface every record kind exposes.
#[async_trait]
pub trait RecordKindClient: Send + Sync {
    fn kind(&self) -> RecordKind;

    /// Named commands this kind accepts; empty for kinds without commands.
    fn commands(&self) -> &'static [CommandSpec] {
        &[]
    }

    async fn list(&self, query: &ListQuery) -> Result<ListResult<CatalogRecord>, ClientError>;
    async fn get_by_id(&self, id: &RecordId) -> Result<CatalogRecord, ClientError>;
    async fn create(&self, data: &Map<String, Value>) -> Result<CatalogRecord, ClientError>;
    async fn update(
        &self,
        id: &RecordId,
        partial: &Map<String, Value>,
    ) -> Result<CatalogRecord, ClientError>;
    /// Audited kinds require `audit`; other kinds ignore it.
    async fn delete(
        &self,
        id: &RecordId,
        audit: Option<&AuditedDeleteRequest>,
    ) -> Result<(), ClientError>;
    async fn bulk_action(&self, action: BulkAction, ids: &[RecordId]) -> Result<Value, ClientError>;
    async fn command(
        &self,
        id: &RecordId,
        command: &CommandInvocation,
    ) -> Result<CatalogRecord, ClientError>;

    async fn bulk_delete(&self, ids: &[RecordId]) -> Result<Value, ClientError> {
        self.bulk_action(BulkAction::Delete, ids).await
    }

    async fn mutate(&self, id: &RecordId, mutation: &Mutation) -> Result<CatalogRecord, ClientError> {
        match mutation {
            Mutation::FieldEdit(fields) => self.update(id, fields).await,
            Mutation::Command(command) => self.command(id, command).await,
        }
    }
}

/// The one implementation behind all nine kinds; behavior differences come
/// from the kind's [`RecordKindSpec`].
pub struct KindClient {
    spec: &'static RecordKindSpec,
    collection_url: Url,
    transport: Arc<dyn Transport>,
}

impl KindClient {
    /// `base_url` must be a hierarchical URL; the registry validates it.
    pub fn new(kind: RecordKind, base_url: &Url, transport: Arc<dyn Transport>) -> Self {
        let mut collection_url = base_url.clone();
        if let Ok(mut segments) = collection_url.path_segments_mut() {
            segments.pop_if_empty().push(kind.path());
        }
        Self {
            spec: spec_for(kind),
            collection_url,
            transport,
        }
    }

    pub fn spec(&self) -> &'static RecordKindSpec {
        self.spec
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.collection_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn object(value: &Map<String, Value>) -> Value {
        Value::Object(value.clone())
    }

    fn check_guarded_fields(&self, partial: &Map<String, Value>) -> Result<(), ClientError> {
        for field in partial.keys() {
            if let Some(command) = self.spec.guarding_command(field) {
                return Err(ClientError::GuardedField {
                    kind: self.spec.kind,
                    field: field.clone(),
                    command: command.name,
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RecordKindClient for KindClient {
    fn kind(&self) -> RecordKind {
        self.spec.kind
    }

    fn commands(&self) -> &'static [CommandSpec] {
        self.spec.commands
    }

    async fn list(&self, query: &ListQuery) -> Result<ListResult<CatalogRecord>, ClientError> {
        let mut url = self.collection_url.clone();
        let encoded = query_codec::encode(query);
        if !encoded.is_empty() {
            url.set_query(Some(&encoded));
        }
        let result: ListResult<CatalogRecord> =
            self.transport.send(TransportRequest::get(url)).await?.into_json()?;
        debug!(kind = %self.spec.kind, items = result.items.len(), total = result.total, "listed records");
        Ok(result)
    }

    async fn get_by_id(&self, id: &RecordId) -> Result<CatalogRecord, ClientError> {
        self.transport
            .send(TransportRequest::get(self.url_for(&[id.as_str()])))
            .await?
            .into_json()
    }

    async fn create(&self, data: &Map<String, Value>) -> Result<CatalogRecord, ClientError> {
        let record: CatalogRecord = self
            .transport
            .send(TransportRequest::post(self.collection_url.clone(), Self::object(data)))
            .await?
            .into_json()?;
        info!(kind = %self.spec.kind, id = %record.id, "created record");
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        partial: &Map<String, Value>,
    ) -> Result<CatalogRecord, ClientError> {
        self.check_guarded_fields(partial)?;
        self.transport
            .send(TransportRequest::patch(
                self.url_for(&[id.as_str()]),
                Self::object(partial),
            ))
            .await?
            .into_json()
    }

    async fn delete(
        &self,
        id: &RecordId,
        audit: Option<&AuditedDeleteRequest>,
    ) -> Result<(), ClientError> {
        let mut url = self.url_for(&[id.as_str()]);
        if self.spec.audited_delete {
            let audit = audit.ok_or(ClientError::MissingAudit {
                kind: self.spec.kind,
            })?;
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(audit.query_pairs())
                .finish();
            url.set_query(Some(&query));
        }

        self.transport
            .send(TransportRequest::delete(url))
            .await?
            .into_success()?;
        info!(kind = %self.spec.kind, %id, audited = self.spec.audited_delete, "deleted record");
        Ok(())
    }

    async fn bulk_action(&self, action: BulkAction, ids: &[RecordId]) -> Result<Value, ClientError> {
        let request = BulkActionRequest {
            action,
            ids: ids.to_vec(),
        };
        let body = serde_json::to_value(&request)?;
        let response = self
            .transport
            .send(TransportRequest::post(self.url_for(&["bulk-action"]), body))
            .await?
            .into_value()?;
        info!(kind = %self.spec.kind, action = %request.action, count = ids.len(), "bulk action applied");
        Ok(response)
    }

    async fn command(
        &self,
        id: &RecordId,
        command: &CommandInvocation,
    ) -> Result<CatalogRecord, ClientError> {
        let spec = self
            .spec
            .command(&command.name)
            .ok_or_else(|| ClientError::UnknownCommand {
                kind: self.spec.kind,
                name: command.name.clone(),
            })?;
        if spec.reason == ReasonPolicy::Required && !command.has_reason() {
            return Err(ClientError::MissingReason {
                kind: self.spec.kind,
                command: command.name.clone(),
            });
        }

        let url = self.url_for(&[id.as_str(), "commands", spec.name]);
        let record = self
            .transport
            .send(TransportRequest::post(url, command.body()))
            .await?
            .into_json()?;
        info!(kind = %self.spec.kind, %id, command = spec.name, "command applied");
        Ok(record)
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
