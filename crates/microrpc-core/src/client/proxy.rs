//! Remote namespace proxies.
//!
//! A [`RemoteProxy`] stands in for a namespace on a server. There are no
//! synthesized members: attributes are looked up by name with
//! [`RemoteProxy::attr`] or called directly with [`RemoteProxy::call`].
//! The set of known attribute names is discovered with one `dir` round trip
//! the first time it is needed and kept until [`RemoteProxy::clear_cache`].

use super::interpreter::{interpret, Reply};
use super::transport::{HttpTransport, Transport};
use crate::envelope::{Kwargs, Magic, Request};
use crate::error::{RpcError, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Client-side handle on a remote namespace.
pub struct RemoteProxy {
    namespace: String,
    host: String,
    port: u16,
    transport: Arc<dyn Transport>,
    attrs: RwLock<BTreeSet<String>>,
}

impl RemoteProxy {
    /// Proxy `namespace` on the server at `host:port` over HTTP.
    pub fn connect(namespace: impl Into<String>, host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        let transport = HttpTransport::new(&host, port)?;
        Ok(Self::with_transport(namespace, host, port, Arc::new(transport)))
    }

    /// Proxy over an arbitrary transport. `host` and `port` are descriptive.
    pub fn with_transport(
        namespace: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            host: host.into(),
            port,
            transport,
            attrs: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Known attribute names, sorted.
    ///
    /// Performs a `dir` round trip only while the cache is empty.
    pub async fn attributes(&self) -> Result<Vec<String>> {
        self.discover().await?;
        Ok(self.attrs.read().await.iter().cloned().collect())
    }

    /// Resolve `name` into a fresh bound call.
    ///
    /// Fails locally with `AttributeNotFound` if the name is not among the
    /// (possibly just discovered) attributes.
    pub async fn attr(&self, name: &str) -> Result<BoundCall> {
        self.discover().await?;
        if !self.attrs.read().await.contains(name) {
            return Err(RpcError::AttributeNotFound {
                namespace: self.namespace.clone(),
                attr: name.to_string(),
            });
        }
        Ok(self.bind(name))
    }

    /// Resolve and invoke `name` in one step.
    pub async fn call(&self, name: &str, args: Vec<Value>, kwargs: Kwargs) -> Result<Value> {
        self.attr(name).await?.call(args, kwargs).await
    }

    /// Documentation for the whole remote namespace.
    pub async fn help(&self) -> Result<String> {
        fetch_help(self.transport.as_ref(), &self.namespace, None).await
    }

    /// Documentation for one attribute, resolved like [`RemoteProxy::attr`].
    pub async fn help_on(&self, name: &str) -> Result<String> {
        self.attr(name).await?.help().await
    }

    /// Forget discovered attributes; the next lookup asks the server again.
    pub async fn clear_cache(&self) {
        self.attrs.write().await.clear();
    }

    fn bind(&self, name: &str) -> BoundCall {
        BoundCall::new(
            self.namespace.clone(),
            name,
            self.host.clone(),
            self.port,
            self.transport.clone(),
        )
    }

    async fn discover(&self) -> Result<()> {
        if !self.attrs.read().await.is_empty() {
            return Ok(());
        }

        let request = Request::introspect(self.namespace.clone(), None, Magic::Dir);
        let reply = interpret(self.transport.round_trip(&request).await?)?;
        let names: BTreeSet<String> = serde_json::from_value(reply.data)?;

        // A concurrent lookup may have filled the cache meanwhile; the first
        // snapshot wins.
        let mut attrs = self.attrs.write().await;
        if attrs.is_empty() {
            debug!("Discovered {} attributes on {}", names.len(), self.namespace);
            *attrs = names;
        }
        Ok(())
    }
}

impl std::fmt::Display for RemoteProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RemoteProxy(namespace={:?}, host={:?}, port={})",
            self.namespace, self.host, self.port
        )
    }
}

impl std::fmt::Debug for RemoteProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

/// One remote attribute, ready to be invoked.
///
/// Created per lookup and dropped after use.
pub struct BoundCall {
    namespace: String,
    attr: String,
    host: String,
    port: u16,
    transport: Arc<dyn Transport>,
}

impl BoundCall {
    /// Bind an attribute without consulting any proxy cache; the server
    /// decides whether it exists.
    pub fn new(
        namespace: impl Into<String>,
        attr: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            attr: attr.into(),
            host: host.into(),
            port,
            transport,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// Invoke the remote attribute and return its result.
    pub async fn call(&self, args: Vec<Value>, kwargs: Kwargs) -> Result<Value> {
        Ok(self.call_with_reply(args, kwargs).await?.data)
    }

    /// Invoke and keep the deprecation notice, if any.
    pub async fn call_with_reply(&self, args: Vec<Value>, kwargs: Kwargs) -> Result<Reply> {
        let request = Request::invoke(self.namespace.clone(), self.attr.clone(), args, kwargs);
        interpret(self.transport.round_trip(&request).await?)
    }

    /// Documentation for this attribute.
    pub async fn help(&self) -> Result<String> {
        fetch_help(self.transport.as_ref(), &self.namespace, Some(&self.attr)).await
    }
}

impl std::fmt::Debug for BoundCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCall")
            .field("namespace", &self.namespace)
            .field("attr", &self.attr)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

async fn fetch_help(transport: &dyn Transport, namespace: &str, attr: Option<&str>) -> Result<String> {
    let request = Request::introspect(namespace, attr.map(String::from), Magic::Help);
    let reply = interpret(transport.round_trip(&request).await?)?;
    Ok(match reply.data {
        Value::String(text) => text,
        other => other.to_string(),
    })
}
