use soporte_remoto::{
    app_state::AppState,
    config::{self, AppConfig},
    logging::init_logging,
    server::build_router,
    sessions::session_key,
};
use std::net::SocketAddr;
use thiserror::Error;
use tower_sessions::MemoryStore;
use tracing::{info, warn};

#[derive(Debug, Error)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Logging error: {0}")]
    Logging(String),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging first
    init_logging().map_err(|e| AppError::Logging(e.to_string()))?;
    info!("Starting soporte-remoto download server");

    let config = AppConfig::load()?;
    info!(
        storage_root = %config.storage.root.display(),
        "Configuration loaded successfully"
    );

    if config.security.admin_password.is_none() {
        warn!("ADMIN_PASSWORD not configured; admin panel is disabled");
    }
    let secret = config.session_secret_bytes()?;
    if secret.is_none() {
        warn!("SESSION_SECRET not configured; sessions will not survive a restart");
    }
    let key = session_key(secret.as_deref());

    let addr = SocketAddr::new(config.server.bind_addr.parse()?, config.server.port);
    let app = build_router(AppState::new(config), MemoryStore::default(), key);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
