//! Client-side unpacking of response documents.

use crate::envelope::Response;
use crate::error::{kind, RpcError, Result};
use serde_json::Value;
use tracing::warn;

/// A successful call result plus any deprecation notice the server attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub data: Value,
    pub deprecation: Option<String>,
}

/// Unpack a response.
///
/// A deprecation flag is logged as a warning and reported in the reply; it
/// never fails the call. An error flag becomes [`RpcError::Remote`] carrying
/// the transmitted kind name and message.
pub fn interpret(response: Response) -> Result<Reply> {
    let deprecation = if response.deprecated {
        warn!("DeprecationWarning: {}", response.deprecation_message);
        Some(response.deprecation_message)
    } else {
        None
    };

    if response.error {
        return Err(RpcError::Remote {
            kind: response
                .error_type
                .unwrap_or_else(|| kind::REMOTE_ERROR.to_string()),
            message: response.error_message.unwrap_or_default(),
        });
    }

    Ok(Reply {
        data: response.data,
        deprecation,
    })
}
