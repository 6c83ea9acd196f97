use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::TokenIssuer;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(help = "User id to put in the subject claim")]
    pub user_id: String,

    #[arg(long, help = "Token lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

/// Mint a development token for `user` from the configured secret
pub fn mint(config: &AppConfig, user: &str, hours: Option<u64>) -> anyhow::Result<String> {
    let lifetime = hours.unwrap_or(config.security.jwt_expiry_hours);
    let issuer = TokenIssuer::new(&config.security.jwt_secret, lifetime)
        .context("JWT_SECRET must be set to mint tokens")?;
    Ok(issuer.issue(user)?)
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let token = mint(&config, &args.user_id, args.hours)?;

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "user_id": args.user_id, "token": token }))?
            );
        }
        OutputFormat::Text => println!("{}", token),
    }
    Ok(())
}
