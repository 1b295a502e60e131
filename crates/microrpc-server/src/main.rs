//! microrpc server - exposes registered units over a single HTTP endpoint.
//!
//! Every request names a namespace and an attribute; the server resolves it
//! against the registry and answers with a JSON response document.

mod handler;
mod server;
mod units;

use anyhow::Result;
use clap::Parser;
use microrpc::{DispatchRegistry, Dispatcher, ServerConfig, UnitLoader};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "microrpc-server")]
#[command(about = "Minimal RPC server exposing units over HTTP")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = ServerConfig::DEFAULT_HOST)]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Unit to register; repeat for several (defaults to every built-in unit)
    #[arg(short, long = "unit")]
    units: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting microrpc server");

    let catalog = units::builtin_catalog();
    let names = if args.units.is_empty() {
        catalog.available()
    } else {
        args.units
    };

    let registry = Arc::new(DispatchRegistry::new(catalog));
    for name in &names {
        registry.register(name)?;
    }

    let addr = server::start_server(Dispatcher::new(registry), &args.host, args.port).await?;

    // Print port for the launching process to read (intentional stdout)
    println!("RPC_PORT={}", addr.port());

    info!("RPC server running on {} serving {:?}", addr, names);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
