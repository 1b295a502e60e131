//! Client side of the protocol.
//!
//! - **Proxy**: [`RemoteProxy`] and [`BoundCall`] turn names into calls
//! - **Interpreter**: [`interpret`] turns responses into values or errors
//! - **Transport**: [`Transport`] moves one document each way

mod interpreter;
mod proxy;
mod transport;

pub use interpreter::{interpret, Reply};
pub use proxy::{BoundCall, RemoteProxy};
pub use transport::{endpoint_url, HttpTransport, Transport};
