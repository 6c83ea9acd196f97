use serde_json::json;

use crate::cli::OutputFormat;
use crate::database::models::task::Task;

/// One line per task: completion mark, id, title
pub fn format_task_line(task: &Task) -> String {
    let mark = if task.is_completed { "[x]" } else { "[ ]" };
    format!("{} {:>5}  {}", mark, task.id, task.title)
}

/// Output a list of tasks in the appropriate format
pub fn output_tasks(output_format: &OutputFormat, tasks: &[Task]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(tasks)?);
        }
        OutputFormat::Text => {
            if tasks.is_empty() {
                println!("No tasks");
            }
            for task in tasks {
                println!("{}", format_task_line(task));
            }
        }
    }
    Ok(())
}

/// Output a single task in the appropriate format
pub fn output_task(output_format: &OutputFormat, task: &Task) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(task)?);
        }
        OutputFormat::Text => {
            println!("{}", format_task_line(task));
            if let Some(description) = &task.description {
                println!("        {}", description);
            }
            println!(
                "        created {}  updated {}",
                task.created_at.format("%Y-%m-%d %H:%M"),
                task.updated_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
    Ok(())
}

/// Output a success message in the appropriate format
pub fn output_message(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "message": message }))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn task_line_shows_completion() {
        let now = Utc::now();
        let mut task = Task {
            id: 12,
            owner_id: "u1".to_string(),
            title: "Buy milk".to_string(),
            description: None,
            is_completed: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(format_task_line(&task), "[ ]    12  Buy milk");
        task.is_completed = true;
        assert_eq!(format_task_line(&task), "[x]    12  Buy milk");
    }
}
