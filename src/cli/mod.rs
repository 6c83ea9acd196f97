pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Todo CLI - run the task API or manage your tasks from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "API base URL (defaults to $TODO_API_URL or http://127.0.0.1:8000)")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the API server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Print a development token signed with $JWT_SECRET")]
    Token(commands::token::TokenArgs),

    #[command(about = "Task operations for one user")]
    Task {
        #[command(flatten)]
        auth: commands::task::AuthArgs,

        #[command(subcommand)]
        cmd: commands::task::TaskCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Resolve the server URL from the flag, then `TODO_API_URL`, then the default
pub fn server_url(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("TODO_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args).await,
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Task { auth, cmd } => {
            let server = server_url(cli.server);
            commands::task::handle(cmd, auth, &server, output_format).await
        }
    }
}
