//! Single-record lookup for detail views.

use std::time::Duration;

use shared::domain::{CatalogRecord, RecordId};
use tracing::warn;

use crate::{client::RecordKindClient, config::Settings, error::ClientError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const NONE: RetryPolicy = RetryPolicy {
        retries: 0,
        delay: Duration::ZERO,
    };

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            retries: settings.detail_retry_attempts,
            delay: settings.detail_retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Not-found and forbidden are outcomes a detail view renders, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Found(CatalogRecord),
    NotFound,
    Forbidden,
}

/// Fetches one record, retrying only transient failures. Not-found and
/// forbidden answers are final on the first attempt.
pub async fn fetch_detail(
    client: &dyn RecordKindClient,
    id: &RecordId,
    policy: RetryPolicy,
) -> Result<DetailOutcome, ClientError> {
    let mut failures = 0;
    loop {
        match client.get_by_id(id).await {
            Ok(record) => return Ok(DetailOutcome::Found(record)),
            Err(err) if err.is_not_found() => return Ok(DetailOutcome::NotFound),
            Err(err) if err.is_forbidden() => return Ok(DetailOutcome::Forbidden),
            Err(err) if err.is_transient() && failures < policy.retries => {
                failures += 1;
                warn!(kind = %client.kind(), %id, attempt = failures, error = %err, "retrying detail lookup");
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(err) => return Err(err),
        }
    }
}
