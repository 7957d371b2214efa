use std::{mem, sync::Arc};

use anyhow::Context;
use broker::{Broker, Runtime, gateway};
use log::info;
use model::RegistryBuilder;
use prediction_tracer::{PredictionRequestHandler, ServiceConfig, service};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = ServiceConfig::from_env().context("failed to load the configuration")?;

    let registry = RegistryBuilder::new()
        .build(mem::take(&mut config.models))
        .context("failed to build the model registry")?;
    info!("loaded {} model(s)", registry.len());

    let broker = Broker::new(config.channel_capacity);
    let runtime = Runtime::new(broker.clone());
    let handler = PredictionRequestHandler::new(Arc::new(registry));
    service::register(&runtime, &config, handler);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening at {addr}");

    let gateway = tokio::spawn(gateway::serve(listener, broker, runtime.shutdown_token()));

    signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("received SIGINT, shutting down");

    runtime.shutdown().await;
    gateway.await.context("gateway task failed")?;

    Ok(())
}
