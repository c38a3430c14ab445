use feedwatch::prelude::*;
use feedwatch::utils::logger;
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> Result<()> {
    logger::init("info");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)?;
    info!("starting {}", config.name);

    let registry = Arc::new(default_registry());
    let store = Arc::new(FileSubscriberStore::new(&config.notifier.subscriber_file));
    let transport = Arc::new(HttpDelivery::new(Duration::from_secs(
        config.notifier.delivery_timeout_secs(),
    ))?);
    let notifier = Arc::new(SubscriberRegistry::load(store, transport).await);
    let pipeline = Arc::new(ContentPipeline::new(registry, notifier.clone()));

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    if let Some(source_config) = &config.source {
        let source = Arc::new(HttpContentSource::new(
            source_config.url.clone(),
            Duration::from_secs(30),
        )?);
        let interval = Duration::from_secs(source_config.poll_interval_secs());
        PollMonitor::new(source, pipeline.clone(), interval).spawn(shutdown_tx.subscribe());
    } else {
        info!("no pull source configured, push-only mode");
    }

    let app = api::router(ApiState::new(pipeline, notifier));
    let listener = tokio::net::TcpListener::bind(config.api.bind_addr()).await?;
    info!("api listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(());
        })
        .await?;

    Ok(())
}
