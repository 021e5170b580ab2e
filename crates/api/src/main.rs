#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vitrina_observability::init();

    let config = vitrina_api::config::Config::load();
    let bind_addr = config.bind_addr.clone();

    let pool = vitrina_infra::connect_lazy(&config.database_url)?;
    let app = vitrina_api::app::build_app(config, pool);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
