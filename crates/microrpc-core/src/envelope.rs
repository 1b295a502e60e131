//! Request and response envelopes and their JSON encoding.
//!
//! Every round trip carries exactly one JSON document each way:
//!
//! ```text
//! request:  {"namespace": str, "attr": str|null, "args": [..], "kwargs": {..}, "magic": "dir"|"help"|null}
//! response: {"data": any, "deprecated": bool, "deprecation_message": str,
//!            "error": bool, "error_type": str|null, "error_message": str|null}
//! ```
//!
//! A request body may also be a JSON string whose content is the request
//! document; some clients encode the document twice.

use crate::error::{RpcError, Result};
use crate::unit::Failure;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Named arguments of a call.
pub type Kwargs = Map<String, Value>;

/// Reserved introspection operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Magic {
    /// List the attributes registered under a namespace.
    Dir,
    /// Documentation text for a namespace or one of its attributes.
    Help,
}

impl Magic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Magic::Dir => "dir",
            Magic::Help => "help",
        }
    }
}

impl FromStr for Magic {
    type Err = RpcError;

    fn from_str(code: &str) -> Result<Self> {
        match code {
            "dir" => Ok(Magic::Dir),
            "help" => Ok(Magic::Help),
            other => Err(RpcError::UnsupportedOperation {
                code: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Magic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single call request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub namespace: String,
    #[serde(default)]
    pub attr: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kwargs: Kwargs,
    /// Raw magic code; validated by the introspection handler so that an
    /// unknown namespace is reported before an unknown code.
    #[serde(default)]
    pub magic: Option<String>,
}

impl Request {
    /// Create a normal invocation request.
    pub fn invoke(
        namespace: impl Into<String>,
        attr: impl Into<String>,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            attr: Some(attr.into()),
            args,
            kwargs,
            magic: None,
        }
    }

    /// Create an introspection request.
    pub fn introspect(namespace: impl Into<String>, attr: Option<String>, magic: Magic) -> Self {
        Self {
            namespace: namespace.into(),
            attr,
            args: Vec::new(),
            kwargs: Kwargs::new(),
            magic: Some(magic.as_str().to_string()),
        }
    }

    pub fn is_magic(&self) -> bool {
        self.magic.is_some()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The outcome of a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub deprecation_message: String,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// An empty success response (`data` is null).
    pub fn new() -> Self {
        Self {
            data: Value::Null,
            deprecated: false,
            deprecation_message: String::new(),
            error: false,
            error_type: None,
            error_message: None,
        }
    }

    /// A success response carrying `data`.
    pub fn success(data: Value) -> Self {
        Self {
            data,
            ..Self::new()
        }
    }

    /// A failure response with an explicit kind name and message.
    pub fn failure(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            error_type: Some(kind.into()),
            error_message: Some(message.into()),
            ..Self::new()
        }
    }

    /// A failure response for a routing or parsing error.
    pub fn from_error(err: &RpcError) -> Self {
        Self::failure(err.kind_name(), err.message())
    }

    /// A failure response for an error raised by a callable.
    pub fn from_failure(failure: &Failure) -> Self {
        Self::failure(failure.kind.clone(), failure.message.clone())
    }

    /// Flag the response as coming from a deprecated callable.
    pub fn with_deprecation(mut self, message: impl Into<String>) -> Self {
        self.deprecated = true;
        self.deprecation_message = message.into();
        self
    }
}

/// Parse a request body.
///
/// Never fails with anything but [`RpcError::MalformedRequest`].
pub fn decode_request(body: &[u8]) -> Result<Request> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RpcError::malformed("No data received"));
    }

    let mut document: Value = serde_json::from_slice(body)
        .map_err(|e| RpcError::malformed(format!("Invalid JSON payload: {}", e)))?;

    // Double-encoded payload: the document arrives as a JSON string.
    if let Value::String(inner) = &document {
        document = serde_json::from_str(inner)
            .map_err(|e| RpcError::malformed(format!("Invalid JSON payload: {}", e)))?;
    }

    let object = match &document {
        Value::Null => return Err(RpcError::malformed("No data received")),
        Value::Object(object) => object,
        _ => return Err(RpcError::malformed("Request must be a JSON object")),
    };

    match object.get("namespace") {
        None | Some(Value::Null) => return Err(RpcError::malformed("No namespace supplied")),
        _ => {}
    }

    serde_json::from_value(document)
        .map_err(|e| RpcError::malformed(format!("Invalid request: {}", e)))
}

/// Serialize a request for the transport.
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(request)?)
}

/// Serialize a response for the transport.
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(response)?)
}

/// Parse a response body received from a server.
pub fn decode_response(body: &[u8]) -> Result<Response> {
    serde_json::from_slice(body).map_err(|e| RpcError::Json {
        message: format!("Failed to parse response: {}", e),
        source: Some(e),
    })
}
