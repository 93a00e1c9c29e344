use anyhow::Context;

use rsvp_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rsvp_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = rsvp_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        replies_path = %config.replies_path.display(),
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
