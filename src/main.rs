use todo_api::app;
use todo_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    app::init_tracing();

    // Configuration is built once here and passed down explicitly
    let config = AppConfig::from_env();
    tracing::info!("Starting Todo API in {:?} mode", config.environment);

    let store = app::connect_store(&config).await?;
    app::serve(config, store).await
}
