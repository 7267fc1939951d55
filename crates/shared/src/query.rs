use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A single filter or parameter value as it travels in a query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Empty text carries no information and is dropped by the codec.
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(text) if text.is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

/// A filter entry: either a plain value or a map of sub-keys, which is how
/// ranges (`created[from]`, `created[to]`) are expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(Scalar),
    Nested(BTreeMap<String, Option<Scalar>>),
}

impl FilterValue {
    pub fn range(from: Option<Scalar>, to: Option<Scalar>) -> Self {
        FilterValue::Nested(BTreeMap::from([
            ("from".to_string(), from),
            ("to".to_string(), to),
        ]))
    }

    /// True when setting this value should remove the filter instead:
    /// empty text, `false`, or a nested map with no usable entry.
    pub fn is_unset(&self) -> bool {
        match self {
            FilterValue::Scalar(Scalar::Bool(false)) => true,
            FilterValue::Scalar(scalar) => scalar.is_blank(),
            FilterValue::Nested(entries) => entries
                .values()
                .all(|entry| entry.as_ref().map_or(true, Scalar::is_blank)),
        }
    }
}

impl From<Scalar> for FilterValue {
    fn from(value: Scalar) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(value.into())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Scalar(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Scalar(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Scalar(value.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort order: {0}")]
pub struct InvalidSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = InvalidSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(InvalidSortOrder(other.to_string())),
        }
    }
}

/// What page, sort, search and filters are active for one list view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQueryDescriptor {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, FilterValue>,
}

impl ListQueryDescriptor {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            ..Self::default()
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::from_page(self.page, self.limit)
    }

    /// The transport-facing query for this descriptor.
    pub fn to_list_query(&self) -> ListQuery {
        ListQuery {
            pagination: Some(self.pagination()),
            sort: self.sort.clone(),
            order: Some(self.order),
            search: self.search.clone(),
            filters: self.filters.clone(),
        }
    }
}

impl Default for ListQueryDescriptor {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort: None,
            order: SortOrder::Asc,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

/// Offset pagination: `skip = (page - 1) * take`, `page = floor(skip / take) + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub skip: u64,
    pub take: u64,
}

impl Pagination {
    pub fn new(skip: u64, take: u64) -> Self {
        Self {
            skip,
            take: take.max(1),
        }
    }

    pub fn from_page(page: u32, limit: u32) -> Self {
        let take = u64::from(limit.max(1));
        Self {
            skip: u64::from(page.max(1) - 1) * take,
            take,
        }
    }

    /// Page containing `skip`; unaligned offsets floor to the enclosing page.
    pub fn page(&self) -> u64 {
        self.skip / self.take.max(1) + 1
    }

    pub fn limit(&self) -> u64 {
        self.take.max(1)
    }
}

/// Flat parameter bag accepted by a record-kind client's `list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub pagination: Option<Pagination>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub search: Option<String>,
    pub filters: BTreeMap<String, FilterValue>,
}

impl ListQuery {
    pub fn paged(skip: u64, take: u64) -> Self {
        Self {
            pagination: Some(Pagination::new(skip, take)),
            ..Self::default()
        }
    }

    pub fn sorted(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(field.into());
        self.order = Some(order);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}
