use shared::query::Scalar;

use super::*;

fn on_page_four() -> ListQueryDescriptor {
    let mut descriptor = ListQueryDescriptor::with_limit(25);
    descriptor.page = 4;
    descriptor.sort = Some("name".into());
    descriptor.search = Some("billing".into());
    descriptor
        .filters
        .insert("lifecycle".into(), FilterValue::from("active"));
    descriptor
}

#[test]
fn set_page_touches_only_the_page() {
    let current = on_page_four();

    let next = reduce(&current, QueryAction::SetPage(7), &QueryDefaults::default());

    assert_eq!(next.page, 7);
    assert_eq!(next.limit, current.limit);
    assert_eq!(next.sort, current.sort);
    assert_eq!(next.search, current.search);
    assert_eq!(next.filters, current.filters);
}

#[test]
fn every_other_action_resets_to_first_page() {
    let defaults = QueryDefaults::new(20);
    let actions = vec![
        QueryAction::SetLimit(50),
        QueryAction::SetSort {
            field: "owner".into(),
            order: SortOrder::Desc,
        },
        QueryAction::SetSearch(Some("crm".into())),
        QueryAction::filter("owner", "ops"),
        QueryAction::remove_filter("lifecycle"),
        QueryAction::ClearFilters,
    ];

    for action in actions {
        let label = format!("{action:?}");
        let next = reduce(&on_page_four(), action, &defaults);
        assert_eq!(next.page, 1, "{label}");
    }
}

#[test]
fn limit_is_never_zero() {
    let next = reduce(
        &ListQueryDescriptor::default(),
        QueryAction::SetLimit(0),
        &QueryDefaults::default(),
    );
    assert_eq!(next.limit, 1);
}

#[test]
fn sort_defaults_to_ascending() {
    let next = reduce(
        &ListQueryDescriptor::default(),
        QueryAction::sort("createdAt"),
        &QueryDefaults::default(),
    );
    assert_eq!(next.sort.as_deref(), Some("createdAt"));
    assert_eq!(next.order, SortOrder::Asc);
}

#[test]
fn empty_search_clears_it() {
    let next = reduce(
        &on_page_four(),
        QueryAction::SetSearch(Some(String::new())),
        &QueryDefaults::default(),
    );
    assert_eq!(next.search, None);
}

#[test]
fn unset_filter_values_remove_the_key() {
    let defaults = QueryDefaults::default();
    for value in [
        FilterValue::from(""),
        FilterValue::from(false),
        FilterValue::range(None, Some(Scalar::from(""))),
    ] {
        let next = reduce(
            &on_page_four(),
            QueryAction::SetFilter {
                key: "lifecycle".into(),
                value: Some(value),
            },
            &defaults,
        );
        assert!(next.filters.is_empty());
    }
}

#[test]
fn clear_filters_returns_to_view_defaults() {
    let next = reduce(&on_page_four(), QueryAction::ClearFilters, &QueryDefaults::new(50));

    assert_eq!(next, ListQueryDescriptor::with_limit(50));
    assert_eq!(next.sort, None);
    assert_eq!(next.search, None);
}

#[test]
fn reducer_is_idempotent() {
    let defaults = QueryDefaults::default();
    let action = QueryAction::filter("owner", "ops");

    let once = reduce(&on_page_four(), action.clone(), &defaults);
    let twice = reduce(&once, action, &defaults);

    assert_eq!(once, twice);
}

#[test]
fn context_swaps_snapshots_and_counts_real_changes() {
    let mut context = QueryContext::new(QueryDefaults::new(10));
    let before = context.descriptor();

    assert!(context.set_search(Some("erp".into())));
    let after = context.descriptor();
    assert_eq!(context.revision(), 1);
    assert_eq!(before.search, None);
    assert_eq!(after.search.as_deref(), Some("erp"));

    assert!(!context.set_search(Some("erp".into())));
    assert_eq!(context.revision(), 1);
    assert!(!Arc::ptr_eq(&after, &context.descriptor()));
}

#[test]
fn context_setters_follow_reducer_rules() {
    let mut context = QueryContext::new(QueryDefaults::new(10));

    context.set_page(3);
    context.set_sort("name", Some(SortOrder::Desc));
    assert_eq!(context.descriptor().page, 1);
    assert_eq!(context.descriptor().order, SortOrder::Desc);

    context.set_page(2);
    context.set_filter("owner", Some(FilterValue::from("ops")));
    context.set_limit(30);
    assert_eq!(context.descriptor().page, 1);
    assert_eq!(context.descriptor().limit, 30);

    context.clear_filters();
    assert_eq!(*context.descriptor(), ListQueryDescriptor::with_limit(10));
}

#[test]
fn defaults_follow_settings() {
    let settings = Settings {
        default_page_size: 0,
        ..Settings::default()
    };
    assert_eq!(QueryDefaults::from_settings(&settings).limit, 1);
}
