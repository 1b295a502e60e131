//! Centralized configuration for microrpc.
//!
//! Configuration constants for the client transport and the HTTP host.

use std::time::Duration;

/// Client-side transport configuration.
pub struct ClientConfig;

impl ClientConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
    /// Scheme assumed when a host is given without one.
    pub const DEFAULT_SCHEME: &'static str = "http";
    pub const USER_AGENT: &'static str = concat!("microrpc/", env!("CARGO_PKG_VERSION"));
}

/// HTTP host configuration.
pub struct ServerConfig;

impl ServerConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const RPC_PATH: &'static str = "/";
    pub const HEALTH_PATH: &'static str = "/health";
    pub const MAX_CONCURRENT_REQUESTS: usize = 256;
    pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024; // 2MB
}
