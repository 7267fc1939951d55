use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const GENERAL_FIELD: &str = "_general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            400 | 422 => ErrorCode::Validation,
            409 => ErrorCode::Conflict,
            _ => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned by the catalog backend. Every member is optional;
/// servers send some subset of `message`, `detail` and `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ApiErrorBody {
    /// Lenient parse: anything that is not a recognizable error body yields
    /// an empty one.
    pub fn parse(raw: &[u8]) -> Self {
        serde_json::from_slice(raw).unwrap_or_default()
    }

    pub fn summary(&self) -> Option<&str> {
        [self.message.as_deref(), self.detail.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
    }

    /// Field-level messages for forms. Entries without a field name are
    /// skipped; with no field list, `detail` lands under `_general`.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        if !self.errors.is_empty() {
            for error in &self.errors {
                if let Some(field) = &error.field {
                    fields.insert(
                        field.clone(),
                        error
                            .message
                            .clone()
                            .unwrap_or_else(|| "Validation error".to_string()),
                    );
                }
            }
        } else if let Some(detail) = &self.detail {
            fields.insert(GENERAL_FIELD.to_string(), detail.clone());
        }
        fields
    }
}
