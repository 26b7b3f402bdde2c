//! FaultTree Entry Point
//!
//! Loads the tree described by `--data`/`--main` and then either prints a
//! view of it (outline, show, search) or serves it to AI clients over MCP.

use clap::Parser;
use faulttree_core::{NodeId, SelectOutcome, ViewerSession};
use faulttree_server::cli::{Cli, Command};
use faulttree_server::mcp::McpServer;
use faulttree_server::render::{expand_all, render_display, render_outline};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries rendered output or MCP frames
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faulttree_server=info,faulttree_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.to_config();
    tracing::info!("Data source: {} ({})", config.data, config.main_file);

    let session = match ViewerSession::open(&config).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to load fault tree: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Outline { all } => {
            let view = if all {
                expand_all(session.tree())
            } else {
                session.view()
            };
            print!("{}", render_outline(session.tree(), &view));
        }
        Command::Show { id } => {
            let id = NodeId::from(id);
            if session.select(&id).await == SelectOutcome::Ignored {
                eprintln!("Unknown node: {}", id);
                std::process::exit(1);
            }
            print!("{}", render_display(session.tree(), &session.display()));
        }
        Command::Search { query } => {
            let result = session.apply_filter(&query);
            tracing::debug!("{} matches for {:?}", result.matches.len(), result.query);
            print!("{}", render_outline(session.tree(), &session.view()));
        }
        Command::Serve => {
            tracing::info!("Starting FaultTree MCP server");
            let mut server = McpServer::new(Arc::new(session));
            if let Err(e) = server.run().await {
                tracing::error!("MCP server error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
