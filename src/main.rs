// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use fnhost::config::{load_and_validate_config, Config, HostBuilder};
use fnhost::observability::init_tracing;
use fnhost::observability::messages::server::{ConfigLoaded, ServerStarting, UsingDefaultConfig};
use fnhost::proto::functions_server::FunctionsServer;
use fnhost::proto::modules_server::ModulesServer;
use fnhost::proto::subscriber_server::SubscriberServer;
use fnhost::service::{FunctionsService, ModulesService, SubscriberService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;

/// Host WASM functions behind gRPC.
#[derive(Debug, Parser)]
#[command(name = "fnhost-daemon", version)]
struct Args {
    /// YAML configuration file; defaults apply when omitted
    #[arg(short, long, env = "FNHOST_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding `server.address`
    #[arg(short, long, env = "FNHOST_ADDRESS")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let config = load_and_validate_config(path)
                .with_context(|| format!("loading {}", path.display()))?;
            info!(
                "{}",
                ConfigLoaded {
                    path: &path.display().to_string(),
                    binding_count: config.mediator.bindings.len(),
                }
            );
            config
        }
        None => {
            info!("{}", UsingDefaultConfig);
            Config::default()
        }
    };
    if let Some(address) = args.address {
        config.server.address = Some(address);
    }

    let address: SocketAddr = config
        .server
        .get_address()
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.server.get_address()))?;

    let engine = HostBuilder::wasm_engine(&config).context("creating WASM engine")?;
    let host = HostBuilder::from_config(&config, Arc::new(engine))?;

    info!(
        "{}",
        ServerStarting {
            address: &address.to_string(),
            engine: host.gateway.engine_name(),
        }
    );

    let bridge = host.bridge.clone();
    Server::builder()
        .add_service(ModulesServer::new(ModulesService::new(host.clone())))
        .add_service(FunctionsServer::new(FunctionsService::new(host.clone())))
        .add_service(SubscriberServer::new(SubscriberService::new(host)))
        .serve_with_shutdown(address, async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, draining subscriptions");
            bridge.shutdown();
        })
        .await
        .context("gRPC server failed")?;

    Ok(())
}
