mod api;
mod middleware;
mod view;

use std::sync::Arc;
use std::time::Duration;

use shelfwatch_cache::TtlCache;
use shelfwatch_upstream::{MergeEngine, UpstreamClient, UpstreamUrls};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shelfwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, "starting shelfwatch");

    // One cache and one client for the life of the process, shared by all
    // concurrent lookups.
    let cache = Arc::new(TtlCache::new(
        config.cache_capacity,
        Duration::from_secs(config.cache_ttl_secs),
    ));
    let client = Arc::new(UpstreamClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.upstream_client_id.as_deref(),
        Arc::clone(&cache),
        Duration::from_secs(config.html_cache_ttl_secs),
    )?);
    let urls = UpstreamUrls::new(
        &config.retail_api_base,
        &config.availability_api_base,
        config.buying_api_base.as_deref(),
    );
    let engine = Arc::new(MergeEngine::new(Arc::clone(&client), urls));

    let app = build_app(AppState {
        engine,
        client,
        store_pages_base: config.store_pages_base.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
