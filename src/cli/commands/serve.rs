use clap::Args;

use crate::app;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Keep tasks in process memory instead of PostgreSQL")]
    pub in_memory: bool,

    #[arg(long, help = "Port to listen on (overrides API_PORT)")]
    pub port: Option<u16>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    tracing::info!("Starting Todo API in {:?} mode", config.environment);

    let store = if args.in_memory {
        app::memory_store(&config)
    } else {
        app::connect_store(&config).await?
    };

    app::serve(config, store).await
}
