use std::{fmt, str::FromStr};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Opaque identifier of a catalog record, as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The closed set of catalog record kinds. The serialized form is the
/// collection path segment used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "applications")]
    Application,
    #[serde(rename = "servers")]
    Server,
    #[serde(rename = "integrations")]
    Integration,
    #[serde(rename = "data-entities")]
    DataEntity,
    #[serde(rename = "business-capabilities")]
    BusinessCapability,
    #[serde(rename = "organizations")]
    Organization,
    #[serde(rename = "relations")]
    Relation,
    #[serde(rename = "application-services")]
    ApplicationService,
    #[serde(rename = "application-interfaces")]
    ApplicationInterface,
}

impl RecordKind {
    pub const ALL: [RecordKind; 9] = [
        RecordKind::Application,
        RecordKind::Server,
        RecordKind::Integration,
        RecordKind::DataEntity,
        RecordKind::BusinessCapability,
        RecordKind::Organization,
        RecordKind::Relation,
        RecordKind::ApplicationService,
        RecordKind::ApplicationInterface,
    ];

    pub fn path(self) -> &'static str {
        match self {
            RecordKind::Application => "applications",
            RecordKind::Server => "servers",
            RecordKind::Integration => "integrations",
            RecordKind::DataEntity => "data-entities",
            RecordKind::BusinessCapability => "business-capabilities",
            RecordKind::Organization => "organizations",
            RecordKind::Relation => "relations",
            RecordKind::ApplicationService => "application-services",
            RecordKind::ApplicationInterface => "application-interfaces",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Application => "Applications",
            RecordKind::Server => "Servers",
            RecordKind::Integration => "Integrations",
            RecordKind::DataEntity => "Data Entities",
            RecordKind::BusinessCapability => "Business Capabilities",
            RecordKind::Organization => "Organizations",
            RecordKind::Relation => "Relations",
            RecordKind::ApplicationService => "Application Services",
            RecordKind::ApplicationInterface => "Application Interfaces",
        }
    }

    /// Position of the kind within [`RecordKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown record kind: {0}")]
pub struct UnknownRecordKind(pub String);

impl FromStr for RecordKind {
    type Err = UnknownRecordKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.path() == s)
            .ok_or_else(|| UnknownRecordKind(s.to_string()))
    }
}

/// A record of any kind: the identifier plus the remaining JSON fields as the
/// backend returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogRecord {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn into_typed<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        serde_json::from_value(serde_json::to_value(self)?)
    }
}
