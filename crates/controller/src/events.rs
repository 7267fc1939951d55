//! View events and user-facing error modeling.

use std::collections::BTreeMap;

use client_core::{ClientError, DetailOutcome};
use shared::{
    domain::{CatalogRecord, RecordId, RecordKind},
    protocol::ListResult,
};

/// Results delivered back to the UI thread by the fetch bridge.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    ListFetched {
        seq: u64,
        result: Result<ListResult<CatalogRecord>, ClientError>,
    },
    DetailLoaded {
        kind: RecordKind,
        id: RecordId,
        view: DetailView,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Transport,
    NotFound,
    Forbidden,
    Validation,
    Configuration,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorContext {
    ListFetch,
    Detail,
    #[default]
    Mutation,
    BulkAction,
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewError {
    category: ErrorCategory,
    context: ErrorContext,
    message: String,
    field_errors: BTreeMap<String, String>,
}

impl ViewError {
    pub fn from_client(context: ErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Unauthorized { .. } => ErrorCategory::Auth,
            ClientError::Forbidden { .. } => ErrorCategory::Forbidden,
            ClientError::NotFound { .. } => ErrorCategory::NotFound,
            ClientError::Transport { .. } => ErrorCategory::Transport,
            ClientError::Validation { .. }
            | ClientError::MissingAudit { .. }
            | ClientError::InvalidAudit(_)
            | ClientError::MissingReason { .. }
            | ClientError::GuardedField { .. } => ErrorCategory::Validation,
            ClientError::UnknownKind(_)
            | ClientError::UnknownCommand { .. }
            | ClientError::InvalidBaseUrl { .. } => ErrorCategory::Configuration,
            ClientError::Conflict { .. } | ClientError::Decode(_) => ErrorCategory::Unknown,
        };

        Self {
            category,
            context,
            message: err.to_string(),
            field_errors: err.field_errors().cloned().unwrap_or_default(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == ErrorCategory::Auth
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn context(&self) -> ErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Per-field messages for forms; empty unless the server rejected input.
    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn banner(&self) -> String {
        let action = match self.context {
            ErrorContext::ListFetch => "Could not load records",
            ErrorContext::Detail => "Could not load record",
            ErrorContext::Mutation => "Could not save changes",
            ErrorContext::BulkAction => "Bulk action failed",
            ErrorContext::Command => "Command failed",
        };
        format!("{action}: {}", self.message)
    }
}

/// What a detail page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Record(CatalogRecord),
    NotFound,
    AccessDenied,
    Failed(ViewError),
}

impl DetailView {
    pub fn from_result(result: Result<DetailOutcome, ClientError>) -> Self {
        match result {
            Ok(DetailOutcome::Found(record)) => DetailView::Record(record),
            Ok(DetailOutcome::NotFound) => DetailView::NotFound,
            Ok(DetailOutcome::Forbidden) => DetailView::AccessDenied,
            Err(err) => DetailView::Failed(ViewError::from_client(ErrorContext::Detail, &err)),
        }
    }
}
