//! The HTTP call primitive. Everything above this seam talks in
//! [`TransportRequest`]/[`TransportResponse`]; only network-level failures
//! surface as errors here, status handling belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            body: None,
        }
    }

    pub fn delete(url: Url) -> Self {
        Self {
            method: Method::Delete,
            url,
            body: None,
        }
    }

    pub fn post(url: Url, body: Value) -> Self {
        Self {
            method: Method::Post,
            url,
            body: Some(body),
        }
    }

    pub fn patch(url: Url, body: Value) -> Self {
        Self {
            method: Method::Patch,
            url,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes a successful body, or turns the status into a [`ClientError`].
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let body = self.into_success()?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Like [`into_json`](Self::into_json), but an empty body decodes to `null`.
    pub fn into_value(self) -> Result<Value, ClientError> {
        let body = self.into_success()?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    pub fn into_success(self) -> Result<Vec<u8>, ClientError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ClientError::from_status(self.status, &self.body))
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ClientError>;
}

/// [`Transport`] over `reqwest`, speaking JSON.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending catalog request");
        let mut builder = match request.method {
            Method::Get => self.http.get(request.url),
            Method::Post => self.http.post(request.url),
            Method::Patch => self.http.patch(request.url),
            Method::Delete => self.http.delete(request.url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
