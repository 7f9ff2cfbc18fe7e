//! synthcast server binary.

use clap::Parser;
use std::sync::Arc;
use synthcast_core::RenderHost;
use synthcast_server::{Cli, RenderServer, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let host = RenderHost::new(cli.host_config()).inspect_err(|e| {
        tracing::error!(plugin = %cli.plugin, error = %e, "Failed to start render host");
    })?;

    let server = RenderServer::bind(&cli.server_config(), Arc::new(host)).await?;
    server.run().await
}
