use shared::{domain::RecordKind, query::Pagination};

use super::*;
use crate::test_support::FakeClient;

fn page(page: u32, limit: u32) -> ListQueryDescriptor {
    let mut descriptor = ListQueryDescriptor::with_limit(limit);
    descriptor.page = page;
    descriptor
}

fn rows(ids: &[&str]) -> ListResult<CatalogRecord> {
    ListResult {
        items: ids.iter().map(|id| CatalogRecord::new(*id)).collect(),
        total: ids.len() as u64,
    }
}

#[tokio::test]
async fn three_rows_load_without_pagination_artifacts() {
    let client = FakeClient::with_rows(RecordKind::Application, 3);
    let mut controller = ListFetchController::new();
    let descriptor = ListQueryDescriptor::default();

    assert!(!controller.loading());
    let pending = controller.submit(&descriptor);
    assert!(controller.loading());
    assert!(controller.error().is_none());

    let result = client.list(&pending.query).await;
    assert!(controller.complete(pending.seq, result));

    assert!(!controller.loading());
    assert!(controller.error().is_none());
    assert_eq!(controller.items().len(), 3);
    assert_eq!(controller.total(), 3);
    assert_eq!(controller.total_pages(), 1);
    assert_eq!(pending.query.pagination, Some(Pagination::new(0, 10)));
}

#[tokio::test]
async fn page_and_limit_become_skip_and_take() {
    let client = FakeClient::with_rows(RecordKind::Server, 45);
    let mut controller = ListFetchController::new();

    controller.fetch(&client, &page(3, 20)).await;

    assert_eq!(client.queries()[0].pagination, Some(Pagination::new(40, 20)));
    assert_eq!(controller.items().len(), 5);
    assert_eq!(controller.total(), 45);
    assert_eq!(controller.total_pages(), 3);
}

#[tokio::test]
async fn failure_keeps_previous_items() {
    let client = FakeClient::with_rows(RecordKind::Integration, 4);
    let mut controller = ListFetchController::new();
    controller.fetch(&client, &ListQueryDescriptor::default()).await;

    client.fail_next(ClientError::transport("connection reset"));
    assert!(controller.fetch(&client, &page(2, 10)).await);

    assert!(!controller.loading());
    assert_eq!(controller.error(), Some(&ClientError::transport("connection reset")));
    assert_eq!(controller.items().len(), 4);

    controller.refetch(&client).await;
    assert!(controller.error().is_none());
    assert!(controller.items().is_empty());
    assert_eq!(client.queries()[2].pagination, Some(Pagination::new(10, 10)));
}

#[test]
fn stale_response_is_dropped() {
    let mut controller = ListFetchController::new();
    let first = controller.submit(&page(1, 10));
    let second = controller.submit(&page(2, 10));

    assert!(controller.complete(second.seq, Ok(rows(&["newest"]))));
    assert!(!controller.complete(first.seq, Ok(rows(&["stale-a", "stale-b"]))));

    assert_eq!(controller.item_ids(), vec![RecordId::from("newest")]);
    assert_eq!(controller.total(), 1);
}

#[test]
fn loading_holds_until_newest_request_resolves() {
    let mut controller = ListFetchController::new();
    let first = controller.submit(&page(1, 10));
    let second = controller.submit(&page(1, 25));

    assert!(!controller.complete(first.seq, Err(ClientError::transport("late failure"))));
    assert!(controller.loading());
    assert!(controller.error().is_none());

    controller.complete(second.seq, Ok(rows(&["a"])));
    assert!(!controller.loading());
    assert_eq!(controller.descriptor().map(|d| d.limit), Some(25));
}

#[test]
fn duplicate_completion_is_ignored() {
    let mut controller = ListFetchController::new();
    let pending = controller.submit(&page(1, 10));

    assert!(controller.complete(pending.seq, Ok(rows(&["a"]))));
    assert!(!controller.complete(pending.seq, Ok(rows(&["b"]))));
    assert_eq!(controller.item_ids(), vec![RecordId::from("a")]);
}

#[tokio::test]
async fn refetch_before_first_fetch_is_a_no_op() {
    let client = FakeClient::with_rows(RecordKind::Relation, 1);
    let mut controller = ListFetchController::new();

    assert!(!controller.refetch(&client).await);
    assert!(client.calls().is_empty());
}

#[test]
fn total_pages_rounds_up() {
    assert_eq!(total_pages(0, 10), 0);
    assert_eq!(total_pages(10, 10), 1);
    assert_eq!(total_pages(11, 10), 2);
    assert_eq!(total_pages(5, 0), 5);
}
