//! HTTP server implementation using Axum.

use crate::handler::{handle_health, handle_rpc};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use microrpc::{Dispatcher, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Application state shared across handlers.
pub struct AppState {
    /// Routes requests against the process-wide registry
    pub dispatcher: Dispatcher,
}

/// Build the router serving the RPC endpoint and the health check.
pub fn router(dispatcher: Dispatcher) -> Router {
    let state = Arc::new(AppState { dispatcher });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(ServerConfig::HEALTH_PATH, get(handle_health))
        .route(ServerConfig::RPC_PATH, get(handle_rpc).post(handle_rpc))
        .layer(DefaultBodyLimit::max(ServerConfig::MAX_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(ServerConfig::MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the RPC HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(dispatcher: Dispatcher, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let app = router(dispatcher);

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    // Bind to the address
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    // Spawn the server in the background
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::builtin_catalog;
    use microrpc::{BoundCall, DispatchRegistry, HttpTransport, Kwargs, RemoteProxy};
    use serde_json::json;

    async fn start() -> SocketAddr {
        let registry = Arc::new(DispatchRegistry::new(builtin_catalog()));
        registry.register("arith").unwrap();
        registry.register("text").unwrap();
        start_server(Dispatcher::new(registry), "127.0.0.1", 0)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_server_starts() {
        let addr = start().await;
        assert!(addr.port() > 0);
    }

    #[tokio::test]
    async fn test_proxy_over_http() {
        let addr = start().await;
        let arith = RemoteProxy::connect("arith", "127.0.0.1", addr.port()).unwrap();

        let sum = arith
            .call("add", vec![json!(2), json!(3)], Kwargs::new())
            .await
            .unwrap();
        assert_eq!(sum, json!(5));

        let attrs = arith.attributes().await.unwrap();
        assert!(attrs.contains(&"add".to_string()));
        assert!(!attrs.contains(&"PI".to_string()));
    }

    #[tokio::test]
    async fn test_remote_error_over_http() {
        let addr = start().await;
        let arith = RemoteProxy::connect("arith", "http://127.0.0.1", addr.port()).unwrap();

        let err = arith
            .call("div", vec![json!(1), json!(0)], Kwargs::new())
            .await
            .unwrap_err();
        assert!(err.is_kind("ZeroDivisionError"));
        assert_eq!(err.message(), "division by zero");
    }

    #[tokio::test]
    async fn test_missing_attribute_over_http() {
        let addr = start().await;
        let transport = Arc::new(HttpTransport::new("127.0.0.1", addr.port()).unwrap());
        let call = BoundCall::new("arith", "missing", "127.0.0.1", addr.port(), transport);

        let err = call.call(vec![], Kwargs::new()).await.unwrap_err();
        assert_eq!(err.kind_name(), "AttributeNotFound");
        assert_eq!(err.message(), "Module arith has no attribute 'missing'");
    }

    #[tokio::test]
    async fn test_oversized_repeat_keeps_server_alive() {
        let addr = start().await;
        let text = RemoteProxy::connect("text", "127.0.0.1", addr.port()).unwrap();

        let err = text
            .call("repeat", vec![json!("ab"), json!(1i64 << 45)], Kwargs::new())
            .await
            .unwrap_err();
        assert!(err.is_kind("ValueError"));

        let value = text
            .call("upper", vec![json!("still here")], Kwargs::new())
            .await
            .unwrap();
        assert_eq!(value, json!("STILL HERE"));
    }
}
