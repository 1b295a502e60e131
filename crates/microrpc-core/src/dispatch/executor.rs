//! Execution of normal (non-magic) requests.

use crate::envelope::{Kwargs, Response};
use crate::error::{kind, RpcError, Result};
use crate::registry::DispatchRegistry;
use crate::unit::{CallResult, Failure, Function};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, error};

/// Resolve the target callable of a normal request.
pub fn resolve_target(
    registry: &DispatchRegistry,
    namespace: &str,
    attr: Option<&str>,
) -> Result<Arc<Function>> {
    let entry = registry.namespace(namespace)?;
    let attr = attr.ok_or_else(|| RpcError::malformed("No attribute supplied"))?;
    entry
        .function(attr)
        .cloned()
        .ok_or_else(|| RpcError::AttributeNotFound {
            namespace: namespace.to_string(),
            attr: attr.to_string(),
        })
}

/// Invoke `function` on the blocking pool and capture the outcome.
///
/// Whatever the callable raises (or a panic inside it) ends up in the
/// response; nothing propagates past this point.
pub async fn execute(
    namespace: &str,
    function: Arc<Function>,
    args: Vec<Value>,
    kwargs: Kwargs,
) -> Response {
    let target = function.clone();
    let outcome = tokio::task::spawn_blocking(move || target.invoke(args, kwargs))
        .await
        .unwrap_or_else(|e| Err(join_failure(e)));

    let response = capture(namespace, &function, outcome);

    match function.deprecation() {
        Some(message) => response.with_deprecation(message),
        None => response,
    }
}

fn capture(namespace: &str, function: &Function, outcome: CallResult) -> Response {
    match outcome {
        Ok(data) => {
            debug!("{}.{} returned", namespace, function.name());
            Response::success(data)
        }
        Err(failure) => {
            error!(
                "{}.{} raised {}: {}",
                namespace,
                function.name(),
                failure.kind,
                failure.message
            );
            Response::from_failure(&failure)
        }
    }
}

fn join_failure(err: JoinError) -> Failure {
    if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "callable panicked".to_string());
        Failure::new(kind::PANIC, message)
    } else {
        Failure::new("Cancelled", err.to_string())
    }
}
