use std::{sync::Arc, time::Duration};

use serde_json::Value;
use shared::domain::RecordKind;
use tracing::info;
use url::Url;

use crate::{
    client::{KindClient, RecordKindClient},
    config::Settings,
    error::ClientError,
    transport::{HttpTransport, Transport, TransportRequest},
};

/// Dispatch table from record kind to its client, all sharing one transport.
pub struct Registry {
    base_url: Url,
    transport: Arc<dyn Transport>,
    clients: Vec<Arc<dyn RecordKindClient>>,
}

impl Registry {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let clients = RecordKind::ALL
            .into_iter()
            .map(|kind| {
                Arc::new(KindClient::new(kind, &base_url, Arc::clone(&transport)))
                    as Arc<dyn RecordKindClient>
            })
            .collect();
        info!(base_url = %base_url, "record-kind registry ready");
        Ok(Self {
            base_url,
            transport,
            clients,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(Duration::from_secs(settings.request_timeout_secs))?;
        Self::new(&settings.api_base_url, Arc::new(transport))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn client(&self, kind: RecordKind) -> Arc<dyn RecordKindClient> {
        Arc::clone(&self.clients[kind.index()])
    }

    /// Looks a client up by its wire name. Anything outside the nine kinds is
    /// a configuration error.
    pub fn get_client(&self, kind: &str) -> Result<Arc<dyn RecordKindClient>, ClientError> {
        let kind: RecordKind = kind.parse()?;
        Ok(self.client(kind))
    }

    pub fn clients(&self) -> impl Iterator<Item = &Arc<dyn RecordKindClient>> {
        self.clients.iter()
    }

    pub async fn check_health(&self) -> Result<Value, ClientError> {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("health");
        }
        self.transport
            .send(TransportRequest::get(url))
            .await?
            .into_value()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("url cannot carry a path".to_string()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
