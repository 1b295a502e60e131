//! Request/response transports.
//!
//! A [`Transport`] carries one request document to a server and brings one
//! response document back. [`HttpTransport`] talks to a remote host;
//! [`Dispatcher`] implements the trait directly for in-process use.

use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::envelope::{decode_response, Request, Response};
use crate::error::{RpcError, Result};
use tracing::debug;
use url::Url;

/// Carries a single request to a server and returns its response.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: &Request) -> Result<Response>;
}

/// Build the RPC endpoint URL for `host` and `port`.
///
/// `host` may carry a scheme (`http://example.org`); without one
/// [`ClientConfig::DEFAULT_SCHEME`] is assumed.
pub fn endpoint_url(host: &str, port: u16) -> Result<Url> {
    let base = if host.contains("://") {
        host.to_string()
    } else {
        format!("{}://{}", ClientConfig::DEFAULT_SCHEME, host)
    };

    let invalid = |message: String| RpcError::InvalidEndpoint {
        endpoint: format!("{}:{}", host, port),
        message,
    };

    let mut url = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
    url.set_port(Some(port))
        .map_err(|_| invalid("host cannot carry a port".to_string()))?;
    url.set_path("/");
    Ok(url)
}

/// HTTP transport: one GET with a JSON body per call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(ClientConfig::REQUEST_TIMEOUT)
            .connect_timeout(ClientConfig::CONNECT_TIMEOUT)
            .user_agent(ClientConfig::USER_AGENT)
            .build()?;
        Self::with_client(client, host, port)
    }

    /// Use a preconfigured `reqwest` client (timeouts, proxies, ...).
    pub fn with_client(client: reqwest::Client, host: &str, port: u16) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: endpoint_url(host, port)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn round_trip(&self, request: &Request) -> Result<Response> {
        debug!(
            "RPC {} {}.{:?} -> {}",
            request.magic.as_deref().unwrap_or("call"),
            request.namespace,
            request.attr,
            self.endpoint
        );

        let body = self
            .client
            .get(self.endpoint.clone())
            .json(request)
            .send()
            .await?
            .bytes()
            .await?;

        decode_response(&body)
    }
}

#[async_trait::async_trait]
impl Transport for Dispatcher {
    async fn round_trip(&self, request: &Request) -> Result<Response> {
        Ok(self.handle(request.clone()).await)
    }
}
