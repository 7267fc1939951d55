use serde_json::json;
use shared::{domain::RecordKind, protocol::CommandInvocation};

use super::*;
use crate::{
    events::{ErrorCategory, ErrorContext},
    test_support::{ids, FakeClient},
};

#[tokio::test]
async fn failing_mutation_records_and_reraises() {
    let client = FakeClient::with_rows(RecordKind::Server, 2);
    let mut tracker = MutationTracker::new();
    let failure = ClientError::Conflict {
        message: "server still referenced".into(),
    };
    client.fail_next(failure.clone());

    let err = tracker
        .delete_record(&client, &RecordId::from("rec-1"), None)
        .await
        .expect_err("delete fails");

    assert_eq!(err, failure);
    assert!(!tracker.loading());
    assert_eq!(tracker.error(), Some(&failure));
    assert_eq!(client.row_count(), 2);
}

#[tokio::test]
async fn success_clears_previous_error() {
    let client = FakeClient::with_rows(RecordKind::Organization, 2);
    let mut tracker = MutationTracker::new();
    client.fail_next(ClientError::transport("timeout"));
    let _ = tracker.delete_record(&client, &RecordId::from("rec-1"), None).await;
    assert!(tracker.error().is_some());

    tracker
        .delete_record(&client, &RecordId::from("rec-1"), None)
        .await
        .expect("second attempt");

    assert_eq!(tracker.state(), &MutationState::default());
    assert_eq!(client.row_count(), 1);
}

#[test]
fn loading_is_set_while_the_call_runs() {
    let mut tracker = MutationTracker::new();
    tracker.begin();
    assert!(tracker.loading());
    assert!(tracker.error().is_none());

    let value = tracker.finish(Ok::<_, ClientError>(7)).expect("value");
    assert_eq!(value, 7);
    assert!(!tracker.loading());
}

#[tokio::test]
async fn bulk_delete_is_a_single_call() {
    let client = FakeClient::with_rows(RecordKind::Application, 5);
    let mut tracker = MutationTracker::new();

    let response = tracker
        .bulk_delete(&client, &ids(&["rec-1", "rec-3", "rec-5"]))
        .await
        .expect("bulk delete");

    assert_eq!(response, json!({ "affected": 3 }));
    assert_eq!(client.calls(), vec!["bulk delete rec-1,rec-3,rec-5".to_string()]);
    assert_eq!(client.row_count(), 2);
}

#[tokio::test]
async fn bulk_failure_is_one_error_for_the_batch() {
    let client = FakeClient::with_rows(RecordKind::Application, 3);
    let mut tracker = MutationTracker::new();
    client.fail_next(ClientError::transport("archive backend offline"));

    let err = tracker
        .bulk(&client, BulkAction::Archive, &ids(&["rec-1", "rec-2"]))
        .await
        .expect_err("bulk fails");

    assert!(err.is_transient());
    assert_eq!(client.calls().len(), 1);
    assert_eq!(tracker.error(), Some(&err));
}

#[tokio::test]
async fn commands_and_forms_go_through_the_tracker() {
    let client = FakeClient::with_rows(RecordKind::BusinessCapability, 1);
    let mut tracker = MutationTracker::new();
    let id = RecordId::from("rec-1");

    let record = tracker
        .mutate(
            &client,
            &id,
            &Mutation::Command(CommandInvocation::set_parent("cap-0")),
        )
        .await
        .expect("command");
    assert_eq!(record.field("parent_id"), Some(&json!("cap-0")));

    let original = match json!({ "name": "Record 1", "parent": null }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    let mut current = original.clone();
    current.insert("name".into(), json!("Payments"));
    current.insert("parent".into(), json!("cap-9"));

    let merged = tracker
        .save_form(&client, &id, &original, &current)
        .await
        .expect("save form");

    assert_eq!(merged.get("id"), Some(&json!("rec-1")));
    assert_eq!(
        client.calls(),
        vec![
            "command rec-1 set-parent".to_string(),
            "command rec-1 set-parent".to_string(),
            "update rec-1".to_string(),
        ]
    );
}

#[tokio::test]
async fn create_returns_new_record() {
    let client = FakeClient::with_rows(RecordKind::DataEntity, 0);
    let mut tracker = MutationTracker::new();
    let data = match json!({ "name": "Customer" }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };

    let record = tracker.create(&client, &data).await.expect("create");

    assert_eq!(record.id, RecordId::from("rec-1"));
    assert_eq!(client.row_count(), 1);
}

#[tokio::test]
async fn view_error_names_the_failed_write() {
    let client = FakeClient::with_rows(RecordKind::Application, 2);
    let mut tracker = MutationTracker::new();
    assert!(tracker.view_error().is_none());

    client.fail_next(ClientError::transport("gateway timeout"));
    let _ = tracker
        .bulk(&client, BulkAction::Archive, &ids(&["rec-1"]))
        .await;
    let bulk = tracker.view_error().expect("bulk error");
    assert_eq!(bulk.context(), ErrorContext::BulkAction);
    assert_eq!(bulk.category(), ErrorCategory::Transport);

    client.fail_next(ClientError::Forbidden {
        message: "owner changes need approval".into(),
    });
    let _ = tracker
        .mutate(
            &client,
            &RecordId::from("rec-1"),
            &Mutation::Command(CommandInvocation::set_owner("ops", "handover")),
        )
        .await;
    let command = tracker.view_error().expect("command error");
    assert_eq!(command.context(), ErrorContext::Command);
    assert!(command.banner().starts_with("Command failed: "));

    client.fail_next(ClientError::transport("connection reset"));
    let _ = tracker.delete_record(&client, &RecordId::from("rec-2"), None).await;
    assert_eq!(
        tracker.view_error().map(|err| err.context()),
        Some(ErrorContext::Mutation)
    );
}
