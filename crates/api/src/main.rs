use anyhow::Context;

use npi_api::app::{AppServices, build_app};
use npi_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    npi_observability::init();

    let config = AppConfig::from_env()?;
    let services = AppServices::from_config(&config).await?;
    let app = build_app(config.jwt_secret.clone(), services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
