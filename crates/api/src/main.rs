use anyhow::Context;

use forca_api::app::{build_app, services::build_services};
use forca_api::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    forca_observability::init();

    let settings = Settings::from_env().context("invalid settings")?;
    let services = build_services(&settings).context("failed to build services")?;
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
