use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::RecordId;

/// One page of a list call. `items.len()` is below the requested limit only on
/// the last page. The wire envelope also echoes `skip`/`take`, which are
/// ignored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> ListResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BulkAction {
    Delete,
    Archive,
    Export,
    Other(String),
}

impl BulkAction {
    pub fn as_str(&self) -> &str {
        match self {
            BulkAction::Delete => "delete",
            BulkAction::Archive => "archive",
            BulkAction::Export => "export",
            BulkAction::Other(action) => action,
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for BulkAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "delete" => BulkAction::Delete,
            "archive" => BulkAction::Archive,
            "export" => BulkAction::Export,
            _ => BulkAction::Other(value),
        }
    }
}

impl From<BulkAction> for String {
    fn from(value: BulkAction) -> Self {
        value.as_str().to_string()
    }
}

/// Body of `POST /{kind}/bulk-action`: one call for the whole id list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkActionRequest {
    pub action: BulkAction,
    pub ids: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAuditRequest {
    #[error("approval id must not be empty")]
    MissingApprovalId,
    #[error("deletion reason must not be empty")]
    MissingReason,
}

/// Compliance fields required to delete records of audited kinds. Both
/// fields are non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditedDeleteRequest {
    approval_id: String,
    reason: String,
}

impl AuditedDeleteRequest {
    pub fn new(
        approval_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<Self, InvalidAuditRequest> {
        let approval_id = approval_id.into();
        let reason = reason.into();
        if approval_id.trim().is_empty() {
            return Err(InvalidAuditRequest::MissingApprovalId);
        }
        if reason.trim().is_empty() {
            return Err(InvalidAuditRequest::MissingReason);
        }
        Ok(Self {
            approval_id,
            reason,
        })
    }

    pub fn approval_id(&self) -> &str {
        &self.approval_id
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Query parameters carried on the `DELETE` call.
    pub fn query_pairs(&self) -> [(&'static str, &str); 2] {
        [
            ("approval_id", self.approval_id.as_str()),
            ("reason", self.reason.as_str()),
        ]
    }
}

/// A named state-transition call, `POST /{kind}/{id}/commands/{name}`.
/// Payload keys are snake_case on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    pub name: String,
    pub reason: Option<String>,
    pub payload: Map<String, Value>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: None,
            payload: Map::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Adds `key` only when a value is present; absent values are omitted
    /// rather than sent as `null`.
    pub fn with_optional_field(self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with_field(key, value),
            None => self,
        }
    }

    pub fn set_classification(classification: impl Into<Value>, reason: impl Into<String>) -> Self {
        Self::new("set-classification")
            .with_field("classification", classification)
            .with_reason(reason)
    }

    /// Missing target or sunset date are left out of the body.
    pub fn transition_lifecycle(
        target_lifecycle: Option<impl Into<Value>>,
        sunset_date: Option<impl Into<Value>>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new("transition-lifecycle")
            .with_optional_field("target_lifecycle", target_lifecycle)
            .with_optional_field("sunset_date", sunset_date)
            .with_reason(reason)
    }

    pub fn set_owner(owner: impl Into<Value>, reason: impl Into<String>) -> Self {
        Self::new("set-owner")
            .with_field("owner", owner)
            .with_reason(reason)
    }

    pub fn set_parent(parent_id: impl Into<Value>) -> Self {
        Self::new("set-parent").with_field("parent_id", parent_id)
    }

    pub fn remove_parent() -> Self {
        Self::new("remove-parent")
    }

    pub fn has_reason(&self) -> bool {
        self.reason
            .as_deref()
            .is_some_and(|reason| !reason.trim().is_empty())
    }

    /// Request body: the payload plus `reason` when one was given.
    pub fn body(&self) -> Value {
        let mut body = self.payload.clone();
        if let Some(reason) = &self.reason {
            body.insert("reason".to_string(), Value::String(reason.clone()));
        }
        Value::Object(body)
    }
}

/// A write against one record: either a plain field edit (`PATCH`) or a
/// named command. Keeping the two apart stops audited transitions from being
/// smuggled through a generic update.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    FieldEdit(Map<String, Value>),
    Command(CommandInvocation),
}

impl Mutation {
    pub fn label(&self) -> &str {
        match self {
            Mutation::FieldEdit(_) => "field-edit",
            Mutation::Command(command) => &command.name,
        }
    }
}
