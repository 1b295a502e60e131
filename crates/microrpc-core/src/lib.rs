//! microrpc - minimal remote procedure calls over a single HTTP endpoint.
//!
//! A server registers named units of code and exposes their plain functions;
//! a client talks to one namespace through a [`RemoteProxy`], resolving
//! attribute names at call time.
//!
//! # Example
//!
//! ```rust,ignore
//! use microrpc::{Kwargs, RemoteProxy};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> microrpc::Result<()> {
//!     let arith = RemoteProxy::connect("arith", "http://127.0.0.1", 8000)?;
//!
//!     println!("{:?}", arith.attributes().await?);
//!     let sum = arith.call("add", vec![json!(2), json!(3)], Kwargs::new()).await?;
//!     assert_eq!(sum, json!(5));
//!
//!     match arith.call("div", vec![json!(1), json!(0)], Kwargs::new()).await {
//!         Err(e) if e.is_kind("ZeroDivisionError") => println!("{}", e.message()),
//!         other => println!("{:?}", other),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod registry;
pub mod unit;

// Re-export commonly used types
pub use client::{BoundCall, HttpTransport, RemoteProxy, Reply, Transport};
pub use config::{ClientConfig, ServerConfig};
pub use dispatch::Dispatcher;
pub use envelope::{Kwargs, Magic, Request, Response};
pub use error::{RpcError, Result};
pub use registry::{DispatchRegistry, UnitCatalog, UnitLoader};
pub use unit::{Binding, BoundArgs, ClassInfo, Failure, Function, Signature, Unit};
