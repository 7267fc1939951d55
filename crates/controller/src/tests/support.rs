use std::sync::Mutex;

use async_trait::async_trait;
use client_core::{ClientError, RecordKindClient};
use serde_json::{json, Map, Value};
use shared::{
    domain::{CatalogRecord, RecordId, RecordKind},
    protocol::{AuditedDeleteRequest, BulkAction, CommandInvocation, ListResult},
    query::ListQuery,
};

/// In-memory record kind: pages through `rows`, records every call, and can
/// be told to fail the next one.
pub struct FakeClient {
    kind: RecordKind,
    rows: Mutex<Vec<CatalogRecord>>,
    fail_next: Mutex<Option<ClientError>>,
    calls: Mutex<Vec<String>>,
    queries: Mutex<Vec<ListQuery>>,
}

impl FakeClient {
    pub fn with_rows(kind: RecordKind, count: usize) -> Self {
        let rows = (1..=count)
            .map(|n| CatalogRecord::new(format!("rec-{n}")).with_field("name", format!("Record {n}")))
            .collect();
        Self {
            kind,
            rows: Mutex::new(rows),
            fail_next: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next(&self, err: ClientError) {
        *self.fail_next.lock().expect("fail_next") = Some(err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().expect("queries").clone()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().expect("rows").len()
    }

    fn enter(&self, call: String) -> Result<(), ClientError> {
        self.calls.lock().expect("calls").push(call);
        match self.fail_next.lock().expect("fail_next").take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find(&self, id: &RecordId) -> Result<CatalogRecord, ClientError> {
        self.rows
            .lock()
            .expect("rows")
            .iter()
            .find(|row| &row.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                message: format!("{id} not found"),
            })
    }

    fn remove(&self, ids: &[RecordId]) {
        self.rows
            .lock()
            .expect("rows")
            .retain(|row| !ids.contains(&row.id));
    }
}

pub fn ids(raw: &[&str]) -> Vec<RecordId> {
    raw.iter().map(|id| RecordId::from(*id)).collect()
}

#[async_trait]
impl RecordKindClient for FakeClient {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    async fn list(&self, query: &ListQuery) -> Result<ListResult<CatalogRecord>, ClientError> {
        self.queries.lock().expect("queries").push(query.clone());
        self.enter("list".to_string())?;
        let rows = self.rows.lock().expect("rows");
        let (skip, take) = query
            .pagination
            .map_or((0, rows.len()), |p| (p.skip as usize, p.take as usize));
        Ok(ListResult {
            items: rows.iter().skip(skip).take(take).cloned().collect(),
            total: rows.len() as u64,
        })
    }

    async fn get_by_id(&self, id: &RecordId) -> Result<CatalogRecord, ClientError> {
        self.enter(format!("get {id}"))?;
        self.find(id)
    }

    async fn create(&self, data: &Map<String, Value>) -> Result<CatalogRecord, ClientError> {
        self.enter("create".to_string())?;
        let mut rows = self.rows.lock().expect("rows");
        let mut record = CatalogRecord::new(format!("rec-{}", rows.len() + 1));
        record.fields.extend(data.clone());
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        partial: &Map<String, Value>,
    ) -> Result<CatalogRecord, ClientError> {
        self.enter(format!("update {id}"))?;
        let mut record = self.find(id)?;
        record.fields.extend(partial.clone());
        Ok(record)
    }

    async fn delete(
        &self,
        id: &RecordId,
        audit: Option<&AuditedDeleteRequest>,
    ) -> Result<(), ClientError> {
        let call = match audit {
            Some(audit) => format!("delete {id} approval={}", audit.approval_id()),
            None => format!("delete {id}"),
        };
        self.enter(call)?;
        self.remove(std::slice::from_ref(id));
        Ok(())
    }

    async fn bulk_action(&self, action: BulkAction, ids: &[RecordId]) -> Result<Value, ClientError> {
        let joined: Vec<&str> = ids.iter().map(RecordId::as_str).collect();
        self.enter(format!("bulk {action} {}", joined.join(",")))?;
        if action == BulkAction::Delete {
            self.remove(ids);
        }
        Ok(json!({ "affected": ids.len() }))
    }

    async fn command(
        &self,
        id: &RecordId,
        command: &CommandInvocation,
    ) -> Result<CatalogRecord, ClientError> {
        self.enter(format!("command {id} {}", command.name))?;
        let mut record = self.find(id)?;
        record.fields.extend(command.payload.clone());
        Ok(record)
    }
}
