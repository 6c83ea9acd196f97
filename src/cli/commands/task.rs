use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};

use crate::cli::client::TaskClient;
use crate::cli::utils::{output_message, output_task, output_tasks};
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::types::TaskId;

use super::token;

#[derive(Args, Debug)]
pub struct AuthArgs {
    #[arg(long, help = "User id (defaults to $TODO_USER)")]
    pub user: Option<String>,

    #[arg(long, help = "Bearer token (defaults to $TODO_TOKEN, else minted from $JWT_SECRET)")]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    #[command(about = "List tasks, newest first")]
    List,

    #[command(about = "Create a task")]
    Add {
        #[arg(help = "Task title")]
        title: String,
        #[arg(long, help = "Optional description")]
        description: Option<String>,
    },

    #[command(about = "Show one task")]
    Show {
        #[arg(help = "Task ID")]
        id: TaskId,
    },

    #[command(about = "Change fields of a task")]
    Edit {
        #[arg(help = "Task ID")]
        id: TaskId,
        #[arg(long, help = "New title")]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description", help = "New description")]
        description: Option<String>,
        #[arg(long, help = "Remove the description")]
        clear_description: bool,
        #[arg(long, help = "Set completion explicitly (true/false)")]
        completed: Option<bool>,
    },

    #[command(about = "Toggle completion of a task")]
    Done {
        #[arg(help = "Task ID")]
        id: TaskId,
    },

    #[command(about = "Delete a task")]
    Rm {
        #[arg(help = "Task ID")]
        id: TaskId,
    },
}

fn resolve_user(auth: &AuthArgs) -> anyhow::Result<String> {
    auth.user
        .clone()
        .or_else(|| std::env::var("TODO_USER").ok())
        .context("no user given; pass --user or set TODO_USER")
}

fn resolve_token(auth: &AuthArgs, user: &str) -> anyhow::Result<String> {
    if let Some(token) = auth.token.clone().or_else(|| std::env::var("TODO_TOKEN").ok()) {
        return Ok(token);
    }
    token::mint(&AppConfig::from_env(), user, None)
        .context("no token given; pass --token, set TODO_TOKEN, or set JWT_SECRET to mint one")
}

/// Request body for `edit`, holding only the fields that were given
pub fn edit_body(
    title: Option<String>,
    description: Option<String>,
    clear_description: bool,
    completed: Option<bool>,
) -> Value {
    let mut body = Map::new();
    if let Some(title) = title {
        body.insert("title".to_string(), json!(title));
    }
    if clear_description {
        body.insert("description".to_string(), Value::Null);
    } else if let Some(description) = description {
        body.insert("description".to_string(), json!(description));
    }
    if let Some(completed) = completed {
        body.insert("is_completed".to_string(), json!(completed));
    }
    Value::Object(body)
}

pub async fn handle(
    cmd: TaskCommands,
    auth: AuthArgs,
    server: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let user = resolve_user(&auth)?;
    let token = resolve_token(&auth, &user)?;
    let client = TaskClient::new(server, user, token)?;

    match cmd {
        TaskCommands::List => {
            let tasks = client.list().await?;
            output_tasks(&output_format, &tasks)
        }
        TaskCommands::Add { title, description } => {
            let mut body = json!({ "title": title });
            if let Some(description) = description {
                body["description"] = json!(description);
            }
            let task = client.create(&body).await?;
            output_task(&output_format, &task)
        }
        TaskCommands::Show { id } => {
            let task = client.get(id).await?;
            output_task(&output_format, &task)
        }
        TaskCommands::Edit {
            id,
            title,
            description,
            clear_description,
            completed,
        } => {
            let body = edit_body(title, description, clear_description, completed);
            if body.as_object().map_or(true, Map::is_empty) {
                bail!("nothing to change; pass --title, --description, --clear-description or --completed");
            }
            let task = client.update(id, &body).await?;
            output_task(&output_format, &task)
        }
        TaskCommands::Done { id } => {
            let task = client.toggle_complete(id).await?;
            output_task(&output_format, &task)
        }
        TaskCommands::Rm { id } => {
            client.delete(id).await?;
            output_message(&output_format, &format!("Deleted task {}", id))
        }
    }
}
