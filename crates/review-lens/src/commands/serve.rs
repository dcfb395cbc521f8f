//! Serve command: MCP server over stdio.

use anyhow::Context;
use clap::Args;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing::{info, instrument};

use review_lens_core::Config;

use crate::server::ReviewServer;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {}

/// Run the MCP server until the client disconnects.
///
/// The server holds one analysis session for the whole connection.
#[instrument(name = "cmd_serve", skip_all)]
pub async fn cmd_serve(_args: ServeArgs, config: Config) -> anyhow::Result<()> {
    info!("starting MCP server on stdio");

    let service = ReviewServer::new(config)
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await.context("MCP server stopped unexpectedly")?;

    info!("MCP server shut down");
    Ok(())
}
