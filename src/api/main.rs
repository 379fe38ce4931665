use std::error::Error as StdError;
use std::net::SocketAddr;
use tracing::{error, info, warn};

use culture_finder_api::config::AppConfig;
use culture_finder_api::middleware::observability;
use culture_finder_api::routes;
use culture_finder_api::services::refresh_service::parse_schedule;

// Panic hook to catch and log panics
fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_default();
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        error!(%location, "PANIC: {}", message);
    }));
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn StdError + Send + Sync + 'static>> {
    // .env is optional
    dotenvy::dotenv().ok();

    observability::init_tracing();
    setup_panic_hook();
    info!("Application starting...");

    if let Err(e) = observability::init_observability().await {
        warn!("Failed to initialize observability: {}", e);
    }

    let config = AppConfig::from_env()?;
    let port = config.port;
    let schedule = parse_schedule(&config.agenda_refresh_cron)?;
    let refresh_on_startup = config.agenda_refresh_on_startup;

    let app_state = routes::create_app_state_with_storage(config).await?;
    info!(
        "Storage backend: {}",
        if app_state.is_postgres() { "postgres" } else { "memory" }
    );

    // Agenda import and near-events reminders run in the background
    match app_state.refresh() {
        Ok(refresh) => {
            refresh.spawn(schedule, refresh_on_startup);
        }
        Err(e) => warn!("Agenda refresh disabled: {}", e),
    }

    let app = routes::create_app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {} (port {})", addr, port);
    info!("Health check available at http://{}/health", addr);
    info!("OpenAPI spec available at http://{}/api/v1/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    observability::shutdown_observability().await;

    Ok(())
}

/// Resolve on SIGINT (Ctrl+C) or SIGTERM (container stop).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
