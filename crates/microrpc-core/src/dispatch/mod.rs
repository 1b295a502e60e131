//! Server-side request routing.
//!
//! [`Dispatcher`] turns any request body into exactly one response document.
//! Magic requests go to the introspection handler, everything else to the
//! executor. Errors never escape as transport failures.

mod executor;
mod introspection;

pub use executor::{execute, resolve_target};
pub use introspection::introspect;

use crate::envelope::{decode_request, Request, Response};
use crate::registry::DispatchRegistry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes requests against a shared registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<DispatchRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<DispatchRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<DispatchRegistry> {
        &self.registry
    }

    /// Handle a raw request body.
    pub async fn handle_bytes(&self, body: &[u8]) -> Response {
        match decode_request(body) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("Rejected request: {}", e);
                Response::from_error(&e)
            }
        }
    }

    /// Handle a parsed request.
    pub async fn handle(&self, request: Request) -> Response {
        let Request {
            namespace,
            attr,
            args,
            kwargs,
            magic,
        } = request;

        if let Some(code) = magic {
            debug!("Magic {} on {} ({:?})", code, namespace, attr);
            return match introspect(&self.registry, &namespace, attr.as_deref(), &code) {
                Ok(data) => Response::success(data),
                Err(e) => {
                    warn!("Magic {} on {} failed: {}", code, namespace, e);
                    Response::from_error(&e)
                }
            };
        }

        debug!("Call {}.{:?}({} args, {} kwargs)", namespace, attr, args.len(), kwargs.len());

        match resolve_target(&self.registry, &namespace, attr.as_deref()) {
            Ok(function) => execute(&namespace, function, args, kwargs).await,
            Err(e) => {
                warn!("Call on {} failed: {}", namespace, e);
                Response::from_error(&e)
            }
        }
    }
}
