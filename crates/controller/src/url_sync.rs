//! Reads and writes a descriptor as the query parameters of a navigable URL.
//! Parameters this module does not own are left untouched.

use std::collections::BTreeMap;

use shared::query::{FilterValue, ListQueryDescriptor, Scalar, SortOrder};
use url::{form_urlencoded, Url};

use crate::query_state::QueryDefaults;

pub const FILTER_PREFIX: &str = "filter_";

const OWNED_KEYS: [&str; 5] = ["page", "limit", "sort", "order", "search"];

fn is_owned(key: &str) -> bool {
    OWNED_KEYS.contains(&key) || key.starts_with(FILTER_PREFIX)
}

/// `owner` -> (`owner`, None), `created[from]` -> (`created`, Some(`from`)).
fn split_filter_key(key: &str) -> (&str, Option<&str>) {
    match key.strip_suffix(']').and_then(|rest| rest.split_once('[')) {
        Some((name, sub)) if !name.is_empty() && !sub.is_empty() => (name, Some(sub)),
        _ => (key, None),
    }
}

pub fn descriptor_from_url(url: &Url, defaults: &QueryDefaults) -> ListQueryDescriptor {
    let mut descriptor = defaults.descriptor();
    let mut nested: BTreeMap<String, BTreeMap<String, Option<Scalar>>> = BTreeMap::new();

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "page" => {
                descriptor.page = value.parse::<u32>().ok().filter(|page| *page >= 1).unwrap_or(1);
            }
            "limit" => {
                descriptor.limit = value
                    .parse::<u32>()
                    .ok()
                    .filter(|limit| *limit >= 1)
                    .unwrap_or(defaults.limit);
            }
            "sort" if !value.is_empty() => descriptor.sort = Some(value.into_owned()),
            "order" => descriptor.order = value.parse().unwrap_or(SortOrder::Asc),
            "search" if !value.is_empty() => descriptor.search = Some(value.into_owned()),
            other => {
                let Some(filter_key) = other.strip_prefix(FILTER_PREFIX) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                match split_filter_key(filter_key) {
                    (name, Some(sub)) => {
                        nested
                            .entry(name.to_string())
                            .or_default()
                            .insert(sub.to_string(), Some(Scalar::from(value.as_ref())));
                    }
                    (name, None) => {
                        descriptor
                            .filters
                            .insert(name.to_string(), FilterValue::from(value.as_ref()));
                    }
                }
            }
        }
    }

    descriptor
        .filters
        .extend(nested.into_iter().map(|(key, entries)| (key, FilterValue::Nested(entries))));
    descriptor
}

/// Rewrites the descriptor-owned parameters of `url`, keeping every other
/// parameter in its original order ahead of them.
pub fn write_descriptor(url: &mut Url, descriptor: &ListQueryDescriptor) {
    let foreign: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_owned(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.extend_pairs(&foreign);
    query.append_pair("page", &descriptor.page.to_string());
    query.append_pair("limit", &descriptor.limit.to_string());
    if let Some(sort) = &descriptor.sort {
        query.append_pair("sort", sort);
    }
    query.append_pair("order", descriptor.order.as_str());
    if let Some(search) = descriptor.search.as_deref().filter(|search| !search.is_empty()) {
        query.append_pair("search", search);
    }
    for (key, value) in &descriptor.filters {
        match value {
            FilterValue::Scalar(scalar) if !value.is_unset() => {
                query.append_pair(&format!("{FILTER_PREFIX}{key}"), &scalar.to_string());
            }
            FilterValue::Scalar(_) => {}
            FilterValue::Nested(entries) => {
                for (sub, entry) in entries {
                    if let Some(entry) = entry.as_ref().filter(|entry| !entry.is_blank()) {
                        query.append_pair(&format!("{FILTER_PREFIX}{key}[{sub}]"), &entry.to_string());
                    }
                }
            }
        }
    }
    url.set_query(Some(&query.finish()));
}
