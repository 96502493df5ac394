use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finsummary_core::activity::ActivityLog;

mod app;
mod pages;
mod session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = finsummary_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let credentials = match settings.require_admin_credentials() {
        Ok(creds) => Some(Arc::new(creds)),
        Err(e) => {
            tracing::warn!(error = %e, "operator credentials missing; activity log is unreachable");
            None
        }
    };

    let log = ActivityLog::new(&settings.activity_log_path);
    tracing::info!(path = %log.path().display(), "activity log");

    let state = app::AppState {
        log,
        identity: Arc::new(settings.advisor_identity()),
        credentials,
        key: session::signing_key(settings.session_secret.as_deref()),
    };

    let router = app::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &finsummary_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
