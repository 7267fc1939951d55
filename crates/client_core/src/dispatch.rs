//! Turns a form edit (original vs. current values) into the commands and
//! field edits the backend expects for that kind.

use serde_json::{Map, Value};
use shared::{
    domain::{RecordId, RecordKind},
    protocol::{CommandInvocation, Mutation},
};
use tracing::debug;

use crate::{
    client::RecordKindClient,
    commands::{
        ADD_CONSUMER, DEPRECATE, RETIRE, SET_BUSINESS_CAPABILITY, SET_EFFECTIVE_DATES,
        SET_SERVICE, UPDATE, UPDATE_CONFIDENCE, UPDATE_DESCRIPTION,
    },
    error::ClientError,
};

pub const DEFAULT_CLASSIFICATION_REASON: &str = "Updated classification via UI";
pub const DEFAULT_COMMAND_REASON: &str = "Updated via catalog UI";

/// Keys of `current` whose value differs from `original`.
pub fn diff(original: &Map<String, Value>, current: &Map<String, Value>) -> Map<String, Value> {
    current
        .iter()
        .filter(|(key, value)| original.get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Null, empty text and `false` count as "no value".
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.is_empty(),
        _ => true,
    })
}

fn text_or(fields: &Map<String, Value>, key: &str, fallback: &str) -> String {
    present(fields, key)
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

struct Planner<'a> {
    current: &'a Map<String, Value>,
    edits: Map<String, Value>,
    remaining: Map<String, Value>,
    mutations: Vec<Mutation>,
}

impl<'a> Planner<'a> {
    fn new(original: &Map<String, Value>, current: &'a Map<String, Value>) -> Self {
        let edits = diff(original, current);
        Self {
            current,
            remaining: edits.clone(),
            edits,
            mutations: Vec::new(),
        }
    }

    fn changed(&self, key: &str) -> bool {
        self.edits.contains_key(key)
    }

    fn take(&mut self, keys: &[&str]) {
        for key in keys {
            self.remaining.remove(*key);
        }
    }

    fn command(&mut self, command: CommandInvocation) {
        self.mutations.push(Mutation::Command(command));
    }

    fn changed_value(&self, key: &str) -> Value {
        self.edits.get(key).cloned().unwrap_or(Value::Null)
    }

    fn parent(&mut self) {
        if !self.changed("parent") {
            return;
        }
        self.take(&["parent"]);
        let parent_id = present(&self.edits, "parent").cloned();
        match parent_id {
            Some(parent_id) => self.command(CommandInvocation::set_parent(parent_id)),
            None => self.command(CommandInvocation::remove_parent()),
        }
    }

    fn description(&mut self) {
        if !self.changed("description") {
            return;
        }
        self.take(&["description"]);
        let description = match self.changed_value("description") {
            Value::Null => Value::String(String::new()),
            other => other,
        };
        self.command(CommandInvocation::new(UPDATE_DESCRIPTION).with_field("description", description));
    }

    /// Leftover fields become a `PATCH`, or an `update` command for kinds
    /// that route all writes through commands.
    fn finish(mut self, remainder_as_command: bool) -> Vec<Mutation> {
        if !self.remaining.is_empty() {
            let remaining = std::mem::take(&mut self.remaining);
            if remainder_as_command {
                self.command(CommandInvocation {
                    name: UPDATE.to_string(),
                    reason: None,
                    payload: remaining,
                });
            } else {
                self.mutations.push(Mutation::FieldEdit(remaining));
            }
        }
        self.mutations
    }
}

/// Plans the writes for one form submission, in execution order.
pub fn plan_update(
    kind: RecordKind,
    original: &Map<String, Value>,
    current: &Map<String, Value>,
) -> Vec<Mutation> {
    let mut plan = Planner::new(original, current);
    match kind {
        RecordKind::Application => {
            if plan.changed("classification") {
                plan.take(&["classification", "classificationReason"]);
                let reason = text_or(plan.current, "classificationReason", DEFAULT_CLASSIFICATION_REASON);
                let classification = plan.changed_value("classification");
                plan.command(CommandInvocation::set_classification(classification, reason));
            }
            if plan.changed("lifecycle") || plan.changed("sunsetDate") {
                plan.take(&["lifecycle", "sunsetDate"]);
                let target = plan.current.get("lifecycle").cloned();
                let sunset = present(plan.current, "sunsetDate").cloned();
                plan.command(CommandInvocation::transition_lifecycle(
                    target,
                    sunset,
                    DEFAULT_COMMAND_REASON,
                ));
            }
            if plan.changed("owner") {
                plan.take(&["owner"]);
                let owner = plan.changed_value("owner");
                plan.command(CommandInvocation::set_owner(owner, DEFAULT_COMMAND_REASON));
            }
            plan.take(&["classificationReason"]);
            plan.finish(false)
        }
        RecordKind::BusinessCapability => {
            plan.parent();
            plan.description();
            plan.finish(false)
        }
        RecordKind::Organization => {
            plan.parent();
            plan.finish(false)
        }
        RecordKind::ApplicationService => {
            if plan.changed("businessCapabilityId") {
                plan.take(&["businessCapabilityId"]);
                let capability = plan.changed_value("businessCapabilityId");
                plan.command(
                    CommandInvocation::new(SET_BUSINESS_CAPABILITY)
                        .with_field("business_capability_id", capability),
                );
            }
            if plan.changed("consumerAppId") {
                plan.take(&["consumerAppId"]);
                let app_id = plan.changed_value("consumerAppId");
                plan.command(CommandInvocation::new(ADD_CONSUMER).with_field("app_id", app_id));
            }
            plan.finish(true)
        }
        RecordKind::ApplicationInterface => {
            if plan.changed("serviceIds") {
                plan.take(&["serviceIds"]);
                let service_ids = plan.changed_value("serviceIds");
                plan.command(CommandInvocation::new(SET_SERVICE).with_field("service_ids", service_ids));
            }
            if plan.changed("status") {
                plan.take(&["status"]);
                match plan.changed_value("status").as_str() {
                    Some("deprecated") => plan.command(CommandInvocation::new(DEPRECATE)),
                    Some("retired") => plan.command(CommandInvocation::new(RETIRE)),
                    other => debug!(status = ?other, "interface status change has no command"),
                }
            }
            plan.finish(true)
        }
        RecordKind::Relation => {
            if plan.changed("confidence") {
                plan.take(&["confidence"]);
                let confidence = plan.changed_value("confidence");
                plan.command(
                    CommandInvocation::new(UPDATE_CONFIDENCE).with_field("confidence", confidence),
                );
            }
            if plan.changed("effectiveFrom") || plan.changed("effectiveTo") {
                plan.take(&["effectiveFrom", "effectiveTo"]);
                let from = present(plan.current, "effectiveFrom").cloned();
                let to = present(plan.current, "effectiveTo").cloned();
                plan.command(
                    CommandInvocation::new(SET_EFFECTIVE_DATES)
                        .with_optional_field("effective_from", from)
                        .with_optional_field("effective_to", to),
                );
            }
            plan.description();
            plan.finish(false)
        }
        RecordKind::Server | RecordKind::Integration | RecordKind::DataEntity => plan.finish(false),
    }
}

/// Executes [`plan_update`] in order and returns `{id, ...current}`. Stops at
/// the first failing write.
pub async fn apply_update(
    client: &dyn RecordKindClient,
    id: &RecordId,
    original: &Map<String, Value>,
    current: &Map<String, Value>,
) -> Result<Map<String, Value>, ClientError> {
    let plan = plan_update(client.kind(), original, current);
    debug!(kind = %client.kind(), %id, writes = plan.len(), "applying planned update");
    for mutation in &plan {
        client.mutate(id, mutation).await?;
    }

    let mut merged = Map::new();
    merged.insert("id".to_string(), Value::String(id.to_string()));
    merged.extend(current.iter().map(|(key, value)| (key.clone(), value.clone())));
    Ok(merged)
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
