//! Per-kind metadata: whether deletion is audited and which named commands
//! the kind exposes. The generic client is parameterized by this table
//! instead of being written out once per kind.

use shared::domain::RecordKind;

pub const SET_CLASSIFICATION: &str = "set-classification";
pub const TRANSITION_LIFECYCLE: &str = "transition-lifecycle";
pub const SET_OWNER: &str = "set-owner";
pub const SET_PARENT: &str = "set-parent";
pub const REMOVE_PARENT: &str = "remove-parent";
pub const UPDATE_DESCRIPTION: &str = "update-description";
pub const SET_BUSINESS_CAPABILITY: &str = "set-business-capability";
pub const ADD_CONSUMER: &str = "add-consumer";
pub const SET_SERVICE: &str = "set-service";
pub const DEPRECATE: &str = "deprecate";
pub const RETIRE: &str = "retire";
pub const UPDATE: &str = "update";
pub const UPDATE_CONFIDENCE: &str = "update-confidence";
pub const SET_EFFECTIVE_DATES: &str = "set-effective-dates";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonPolicy {
    /// Audited transition: a non-empty reason must accompany the call, and
    /// the fields it owns cannot be changed through a generic update.
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub reason: ReasonPolicy,
    /// Record fields this command owns.
    pub fields: &'static [&'static str],
}

impl CommandSpec {
    const fn audited(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            name,
            reason: ReasonPolicy::Required,
            fields,
        }
    }

    const fn plain(name: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            name,
            reason: ReasonPolicy::Optional,
            fields,
        }
    }

    pub fn owns(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKindSpec {
    pub kind: RecordKind,
    pub audited_delete: bool,
    pub commands: &'static [CommandSpec],
}

impl RecordKindSpec {
    pub fn command(&self, name: &str) -> Option<&'static CommandSpec> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// The audited command owning `field`, if any.
    pub fn guarding_command(&self, field: &str) -> Option<&'static CommandSpec> {
        self.commands
            .iter()
            .find(|command| command.reason == ReasonPolicy::Required && command.owns(field))
    }
}

const APPLICATION_COMMANDS: &[CommandSpec] = &[
    CommandSpec::audited(SET_CLASSIFICATION, &["classification"]),
    CommandSpec::audited(TRANSITION_LIFECYCLE, &["lifecycle", "sunsetDate"]),
    CommandSpec::audited(SET_OWNER, &["owner"]),
];

const BUSINESS_CAPABILITY_COMMANDS: &[CommandSpec] = &[
    CommandSpec::plain(SET_PARENT, &["parent"]),
    CommandSpec::plain(REMOVE_PARENT, &["parent"]),
    CommandSpec::plain(UPDATE_DESCRIPTION, &["description"]),
];

const ORGANIZATION_COMMANDS: &[CommandSpec] = &[
    CommandSpec::plain(SET_PARENT, &["parent"]),
    CommandSpec::plain(REMOVE_PARENT, &["parent"]),
];

const APPLICATION_SERVICE_COMMANDS: &[CommandSpec] = &[
    CommandSpec::plain(SET_BUSINESS_CAPABILITY, &["businessCapabilityId"]),
    CommandSpec::plain(ADD_CONSUMER, &["consumerAppId"]),
    CommandSpec::plain(UPDATE, &[]),
];

const APPLICATION_INTERFACE_COMMANDS: &[CommandSpec] = &[
    CommandSpec::plain(SET_SERVICE, &["serviceIds"]),
    CommandSpec::plain(DEPRECATE, &["status"]),
    CommandSpec::plain(RETIRE, &["status"]),
    CommandSpec::plain(UPDATE, &[]),
];

const RELATION_COMMANDS: &[CommandSpec] = &[
    CommandSpec::plain(UPDATE_CONFIDENCE, &["confidence"]),
    CommandSpec::plain(SET_EFFECTIVE_DATES, &["effectiveFrom", "effectiveTo"]),
    CommandSpec::plain(UPDATE_DESCRIPTION, &["description"]),
];

pub static RECORD_KIND_SPECS: [RecordKindSpec; 9] = [
    RecordKindSpec {
        kind: RecordKind::Application,
        audited_delete: true,
        commands: APPLICATION_COMMANDS,
    },
    RecordKindSpec {
        kind: RecordKind::Server,
        audited_delete: true,
        commands: &[],
    },
    RecordKindSpec {
        kind: RecordKind::Integration,
        audited_delete: true,
        commands: &[],
    },
    RecordKindSpec {
        kind: RecordKind::DataEntity,
        audited_delete: false,
        commands: &[],
    },
    RecordKindSpec {
        kind: RecordKind::BusinessCapability,
        audited_delete: true,
        commands: BUSINESS_CAPABILITY_COMMANDS,
    },
    RecordKindSpec {
        kind: RecordKind::Organization,
        audited_delete: true,
        commands: ORGANIZATION_COMMANDS,
    },
    RecordKindSpec {
        kind: RecordKind::Relation,
        audited_delete: false,
        commands: RELATION_COMMANDS,
    },
    RecordKindSpec {
        kind: RecordKind::ApplicationService,
        audited_delete: true,
        commands: APPLICATION_SERVICE_COMMANDS,
    },
    RecordKindSpec {
        kind: RecordKind::ApplicationInterface,
        audited_delete: false,
        commands: APPLICATION_INTERFACE_COMMANDS,
    },
];

pub fn spec_for(kind: RecordKind) -> &'static RecordKindSpec {
    &RECORD_KIND_SPECS[kind.index()]
}
