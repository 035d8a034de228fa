use std::{net::SocketAddr, sync::Arc};
use study_desk::{
    AppConfig, AppState, LocalStore, advisor::OfflineAdvisor, clock::SystemClock, cues::LogChime,
    router, ticker,
};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let store = LocalStore::open(&config.data_path).await;
    info!(path = %store.path().display(), "store opened");
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(
        config,
        store,
        Arc::new(SystemClock),
        Arc::new(OfflineAdvisor),
        Arc::new(LogChime),
    );

    ticker::spawn(state.clone());
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
