use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::normalize_base_url, fetch_detail, load_settings, spec_for, RecordKindClient, Registry,
    RetryPolicy,
};
use controller::{
    DetailView, ListFetchController, MutationTracker, QueryAction, QueryContext, QueryDefaults,
};
use serde_json::{json, Map, Value};
use shared::{
    domain::{RecordId, RecordKind},
    protocol::{AuditedDeleteRequest, BulkAction, CommandInvocation},
    query::{FilterValue, Scalar, SortOrder},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Command-line client for the EA catalog API")]
struct Cli {
    /// Overrides the base URL from catalog.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the record kinds with their delete policy and commands.
    Kinds,
    Health,
    List {
        kind: RecordKind,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value = "asc")]
        order: SortOrder,
        #[arg(long)]
        search: Option<String>,
        /// `key=value` or `key[sub]=value`; repeatable.
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
    },
    Get {
        kind: RecordKind,
        id: String,
    },
    Create {
        kind: RecordKind,
        json: String,
    },
    /// Plain field edit (PATCH).
    Update {
        kind: RecordKind,
        id: String,
        json: String,
    },
    /// Form-style save: changed fields are routed to commands where the kind
    /// requires it.
    Save {
        kind: RecordKind,
        id: String,
        json: String,
    },
    Delete {
        kind: RecordKind,
        id: String,
        #[arg(long)]
        approval_id: Option<String>,
        #[arg(long)]
        reason: Option<String>,
    },
    Bulk {
        kind: RecordKind,
        action: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    #[command(name = "command")]
    RunCommand {
        kind: RecordKind,
        id: String,
        name: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long, default_value = "{}")]
        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = normalize_base_url(api_url);
    }
    let registry = Registry::from_settings(&settings).context("failed to set up catalog client")?;
    info!(api_base_url = %settings.api_base_url, "catalog client ready");

    match cli.command {
        Command::Kinds => {
            for kind in RecordKind::ALL {
                let spec = spec_for(kind);
                let commands: Vec<&str> = spec.commands.iter().map(|command| command.name).collect();
                println!(
                    "{:<24} {:<24} audited_delete={:<5} commands=[{}]",
                    kind.path(),
                    kind.label(),
                    spec.audited_delete,
                    commands.join(", ")
                );
            }
        }
        Command::Health => {
            let health = registry.check_health().await.context("health check failed")?;
            print_json(&health)?;
        }
        Command::List {
            kind,
            page,
            limit,
            sort,
            order,
            search,
            filters,
        } => {
            let mut query = QueryContext::new(QueryDefaults::from_settings(&settings));
            if let Some(limit) = limit {
                query.dispatch(QueryAction::SetLimit(limit));
            }
            if let Some(field) = sort {
                query.dispatch(QueryAction::SetSort { field, order });
            }
            query.dispatch(QueryAction::SetSearch(search));
            for (key, value) in parse_filters(&filters)? {
                query.dispatch(QueryAction::SetFilter {
                    key,
                    value: Some(value),
                });
            }
            if let Some(page) = page {
                query.dispatch(QueryAction::SetPage(page));
            }

            let descriptor = query.descriptor();
            info!(kind = %kind, page = descriptor.page, limit = descriptor.limit, "listing records");
            let mut fetch = ListFetchController::new();
            fetch.fetch(registry.client(kind).as_ref(), &descriptor).await;
            if let Some(err) = fetch.error() {
                return Err::<(), _>(err.clone()).with_context(|| format!("failed to list {kind}"));
            }
            print_json(&json!({
                "items": fetch.items(),
                "total": fetch.total(),
                "page": descriptor.page,
                "totalPages": fetch.total_pages(),
            }))?;
        }
        Command::Get { kind, id } => {
            let client = registry.client(kind);
            let id = RecordId::new(id);
            let policy = RetryPolicy::from_settings(&settings);
            match DetailView::from_result(fetch_detail(client.as_ref(), &id, policy).await) {
                DetailView::Record(record) => print_json(&serde_json::to_value(record)?)?,
                DetailView::NotFound => bail!("{} {id} not found", kind.label()),
                DetailView::AccessDenied => bail!("access to {} {id} denied", kind.label()),
                DetailView::Failed(err) => {
                    warn!(kind = %kind, %id, category = ?err.category(), "detail lookup failed");
                    bail!(err.banner())
                }
            }
        }
        Command::Create { kind, json } => {
            let data = parse_object(&json)?;
            let record = MutationTracker::new()
                .create(registry.client(kind).as_ref(), &data)
                .await
                .with_context(|| format!("failed to create {kind} record"))?;
            print_json(&serde_json::to_value(record)?)?;
        }
        Command::Update { kind, id, json } => {
            let partial = parse_object(&json)?;
            let record = registry
                .client(kind)
                .update(&RecordId::new(id), &partial)
                .await
                .context("update rejected")?;
            print_json(&serde_json::to_value(record)?)?;
        }
        Command::Save { kind, id, json } => {
            let client = registry.client(kind);
            let id = RecordId::new(id);
            let original = client
                .get_by_id(&id)
                .await
                .with_context(|| format!("failed to load {kind}/{id}"))?
                .fields;
            let mut current = original.clone();
            current.extend(parse_object(&json)?);
            let saved = MutationTracker::new()
                .save_form(client.as_ref(), &id, &original, &current)
                .await
                .context("save failed")?;
            print_json(&Value::Object(saved))?;
        }
        Command::Delete {
            kind,
            id,
            approval_id,
            reason,
        } => {
            let audit = match (approval_id, reason) {
                (Some(approval_id), Some(reason)) => Some(AuditedDeleteRequest::new(approval_id, reason)?),
                (None, None) => None,
                _ => bail!("--approval-id and --reason must be given together"),
            };
            let id = RecordId::new(id);
            MutationTracker::new()
                .delete_record(registry.client(kind).as_ref(), &id, audit.as_ref())
                .await
                .with_context(|| format!("failed to delete {kind}/{id}"))?;
            println!("deleted {kind}/{id}");
        }
        Command::Bulk { kind, action, ids } => {
            let ids: Vec<RecordId> = ids.into_iter().map(RecordId::new).collect();
            let response = MutationTracker::new()
                .bulk(registry.client(kind).as_ref(), BulkAction::from(action), &ids)
                .await
                .context("bulk action failed")?;
            print_json(&response)?;
        }
        Command::RunCommand {
            kind,
            id,
            name,
            reason,
            payload,
        } => {
            let command = CommandInvocation {
                name,
                reason,
                payload: parse_object(&payload)?,
            };
            let record = registry
                .client(kind)
                .command(&RecordId::new(id), &command)
                .await
                .with_context(|| format!("command '{}' failed", command.name))?;
            print_json(&serde_json::to_value(record)?)?;
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_object(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(raw).context("expected a JSON object")? {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object, got {other}"),
    }
}

fn parse_scalar(raw: &str) -> Scalar {
    if let Ok(flag) = raw.parse::<bool>() {
        Scalar::Bool(flag)
    } else if let Ok(number) = raw.parse::<i64>() {
        Scalar::Int(number)
    } else {
        Scalar::Text(raw.to_string())
    }
}

/// `owner=ops` and `created[from]=2024-01-01` style arguments.
fn parse_filters(raw: &[String]) -> Result<BTreeMap<String, FilterValue>> {
    let mut filters = BTreeMap::new();
    for arg in raw {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("filter '{arg}' is not KEY=VALUE");
        };
        let value = parse_scalar(value);
        match key.strip_suffix(']').and_then(|rest| rest.split_once('[')) {
            Some((name, sub)) => {
                let entry = filters
                    .entry(name.to_string())
                    .or_insert_with(|| FilterValue::Nested(BTreeMap::new()));
                match entry {
                    FilterValue::Nested(entries) => {
                        entries.insert(sub.to_string(), Some(value));
                    }
                    FilterValue::Scalar(_) => bail!("filter '{name}' given both plain and nested"),
                }
            }
            None => {
                filters.insert(key.to_string(), FilterValue::Scalar(value));
            }
        }
    }
    Ok(filters)
}
