//! Query string encoding for list calls.
//!
//! Pagination goes out as `page`/`limit` (derived from `skip`/`take` by
//! flooring), nested filter maps as `key[sub]=value`. Unset values never
//! reach the wire.

use std::collections::BTreeMap;

use shared::query::{FilterValue, ListQuery, Scalar};
use url::form_urlencoded;

/// A parameter in the flat bag handed to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Option<Scalar>),
    Nested(BTreeMap<String, Option<Scalar>>),
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        ParamValue::Scalar(Some(value))
    }
}

impl From<&FilterValue> for ParamValue {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Scalar(scalar) => ParamValue::Scalar(Some(scalar.clone())),
            FilterValue::Nested(entries) => ParamValue::Nested(entries.clone()),
        }
    }
}

/// Ordered parameter bag; encoding preserves insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn push_opt(&mut self, key: impl Into<String>, value: Option<Scalar>) -> &mut Self {
        self.entries.push((key.into(), ParamValue::Scalar(value)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            match value {
                ParamValue::Scalar(Some(scalar)) if !scalar.is_blank() => {
                    serializer.append_pair(key, &scalar.to_string());
                }
                ParamValue::Scalar(_) => {}
                ParamValue::Nested(entries) => {
                    for (sub_key, sub_value) in entries {
                        if let Some(scalar) = sub_value.as_ref().filter(|scalar| !scalar.is_blank()) {
                            serializer.append_pair(&format!("{key}[{sub_key}]"), &scalar.to_string());
                        }
                    }
                }
            }
        }
        serializer.finish()
    }
}

impl From<&ListQuery> for QueryParams {
    fn from(query: &ListQuery) -> Self {
        let mut params = QueryParams::new();
        if let Some(pagination) = query.pagination {
            params
                .push("page", Scalar::Int(pagination.page() as i64))
                .push("limit", Scalar::Int(pagination.limit() as i64));
        }
        params
            .push_opt("sort", query.sort.clone().map(Scalar::Text))
            .push_opt("order", query.order.map(|order| Scalar::from(order.as_str())))
            .push_opt("search", query.search.clone().map(Scalar::Text));
        for (key, value) in &query.filters {
            params.push(key.clone(), value);
        }
        params
    }
}

/// Encodes a list query; an empty query encodes to `""`, never `"?"`.
pub fn encode(query: &ListQuery) -> String {
    QueryParams::from(query).encode()
}

#[cfg(test)]
mod tests {
    use shared::query::SortOrder;

    use super::*;

    fn decoded(query: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn pagination_goes_out_as_page_and_limit() {
        let query = encode(&ListQuery::paged(0, 10));
        assert!(query.contains("page=1"));
        assert!(query.contains("limit=10"));
        assert!(!query.contains("skip"));
    }

    #[test]
    fn unaligned_skip_floors_to_enclosing_page() {
        let query = encode(&ListQuery::paged(20, 25));
        assert!(query.contains("page=1"));
        assert!(query.contains("limit=25"));
    }

    #[test]
    fn empty_query_is_empty_string() {
        assert_eq!(encode(&ListQuery::default()), "");
        assert_eq!(QueryParams::new().encode(), "");
    }

    #[test]
    fn escapes_reserved_characters() {
        let query = encode(&ListQuery::default().search("test&value"));
        assert!(query.contains("search=test%26value"));
    }

    #[test]
    fn sort_search_and_filters() {
        let query = encode(
            &ListQuery::paged(50, 25)
                .sorted("id", SortOrder::Desc)
                .search("query")
                .filter("type", "test")
                .filter("critical", true),
        );
        let pairs = decoded(&query);
        for expected in [
            ("page", "3"),
            ("limit", "25"),
            ("sort", "id"),
            ("order", "desc"),
            ("search", "query"),
            ("type", "test"),
            ("critical", "true"),
        ] {
            assert!(
                pairs.contains(&(expected.0.to_string(), expected.1.to_string())),
                "missing {expected:?} in {query}"
            );
        }
    }

    #[test]
    fn nested_filters_use_bracket_keys_and_skip_blank_entries() {
        let query = encode(&ListQuery::default().filter(
            "created",
            FilterValue::range(Some("2024-01-01".into()), Some("".into())),
        ));
        assert_eq!(query, "created%5Bfrom%5D=2024-01-01");
        assert_eq!(
            decoded(&query),
            vec![("created[from]".to_string(), "2024-01-01".to_string())]
        );
    }

    #[test]
    fn omits_unset_scalars() {
        let mut params = QueryParams::new();
        params
            .push_opt("sort", None)
            .push("search", Scalar::from(""))
            .push("owner", Scalar::from("ops team"));
        assert_eq!(params.encode(), "owner=ops+team");
    }
}
