//! SquadPlan server entry point.

use clap::Parser;
use squadplan_server::{AppState, DEFAULT_SECRET, ServerConfig, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,squadplan=debug".into()),
        )
        .init();

    let config = ServerConfig::parse();
    let settings = config.settings()?;

    if settings.secret_key == DEFAULT_SECRET {
        tracing::warn!("SECRET_KEY is the default value; session cookies can be forged");
    }
    if settings.auth.bypass {
        tracing::warn!("DISABLE_AUTH is on; every request is treated as the administrator");
    }

    tracing::info!(
        config_path = %settings.config_path.display(),
        weekend = %settings.weekend,
        categories = ?settings.categories,
        "SquadPlan starting"
    );

    let app = build_router(AppState::new(settings));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
