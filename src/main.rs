use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &dataroom::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        env = %cfg.env,
        database_url = %cfg.database_url,
        dataroom_path = %cfg.dataroom_path.display(),
        loglevel = %cfg.loglevel
    );

    let store = dataroom::db::connect(&cfg.database_url).await?;
    // seed runs once, before the listener binds
    store.bootstrap(&cfg.admin_name, &cfg.admin_email).await?;

    let http = reqwest::Client::builder()
        .user_agent("dataroom/0.3")
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(60))
        .build()?;

    let state = dataroom::router::AppState::new(
        store,
        dataroom::dataroom::Dataroom::new(cfg.dataroom_path.clone()),
        dataroom::billing::Billing::new(http.clone(), cfg.stripe_secret_key.clone()),
        http,
        dataroom::router::cookie_key(),
    );
    let app = dataroom::router::app_router(state);

    let listener = TcpListener::bind(&cfg.bind).await?;
    info!("HTTP server listening on {}", cfg.bind);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
