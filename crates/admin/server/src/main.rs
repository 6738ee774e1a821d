//! Admin Server - push notification dispatch backend.

use std::net::SocketAddr;

use admin_server::Config;
use axum::Router;
use color_eyre::eyre::WrapErr as _;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    let config = Config::load().wrap_err("failed to load config")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_filter))
                .wrap_err("invalid log filter")?,
        )
        .init();

    tracing::info!(config = %Config::config_path().display(), "admin-server starting");

    // Initialize storage
    let storage =
        notify_storage::SqliteStorage::with_pool_size(&config.database.url, config.database.pool_size)
            .wrap_err("failed to initialize storage")?;

    storage
        .run_migrations()
        .wrap_err("failed to run migrations")?;

    // Provider client, built once with injected credentials
    let endpoint = config.push.require_endpoint()?;
    let mut pusher = notify_push::MulticastPusher::new(endpoint, config.push.timeout())?
        .with_invalid_codes(config.push.invalid_token_codes.clone());
    if let Some(api_key) = &config.push.api_key {
        pusher = pusher.with_api_key(api_key);
    }

    let queue = notify_service::DispatchQueue::new(config.dispatch.concurrency);
    let service = notify_service::DispatchService::new(storage, pusher, queue)
        .with_batch_size(config.dispatch.batch_size);

    tracing::info!(
        endpoint = %endpoint,
        batch_size = service.batch_size(),
        concurrency = config.dispatch.concurrency,
        "push dispatch configured"
    );

    // Build router
    let app = Router::new()
        .merge(notify_http::api_router(service))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .wrap_err_with(|| format!("invalid bind address: {}", config.server.bind))?;
    tracing::info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err("failed to bind")?;

    axum::serve(listener, app).await.wrap_err("server error")?;

    Ok(())
}
