mod sound;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use todays_core::{logging, Config, Status, Task, TaskService, TaskStore};

use crate::sound::SoundPlayer;

#[derive(Parser)]
#[command(name = "todays")]
#[command(about = "Today's tasks, in the terminal", long_about = None)]
struct Cli {
    /// Directory holding tasks.json and logs (default: ~/.todays)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log level written to the log file
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Ring the terminal bell on actions
    #[arg(long, global = true)]
    sound: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the Terminal User Interface
    Tui,
    /// Add a new task (usage: add Buy milk)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        note: Vec<String>,
    },
    /// List all tasks
    List,
    /// Change a task's note and/or status
    Update {
        /// Sequence number or id prefix
        selector: String,
        #[arg(long)]
        note: Option<String>,
        /// completed | underway | aborted
        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,
    },
    /// Delete one task
    Delete {
        /// Sequence number or id prefix
        selector: String,
    },
    /// Delete every task
    Clear,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    sequence_number: u32,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Note")]
    note: String,
}

fn parse_status(input: &str) -> Result<Status, String> {
    Status::parse(input).ok_or_else(|| format!("unknown status `{input}`"))
}

fn resolve(service: &TaskService, selector: &str) -> Option<Task> {
    match selector.parse::<u32>() {
        Ok(n) => service
            .find_by_sequence(n)
            .or_else(|| service.find_by_id_prefix(selector)),
        Err(_) => service.find_by_id_prefix(selector),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir, cli.log_level, cli.sound)
        .context("failed to resolve configuration")?;

    if let Err(err) = logging::init_logging(&config.log_level, &config.log_dir) {
        eprintln!("Warning: logging disabled: {err}");
    }

    let store = TaskStore::open(&config.data_dir).with_context(|| {
        format!(
            "failed to open task store in {}",
            config.data_dir.display()
        )
    })?;
    let service = TaskService::new(Arc::new(store));

    match cli.command {
        Some(Commands::Tui) | None => {
            tui::run(service, SoundPlayer::new(config.sound))?;
        }
        Some(Commands::Add { note }) => {
            let note = note.join(" ");
            match service.add(&note)? {
                Some(task) => println!(
                    "Task added: #{} {} (ID: {})",
                    task.sequence_number, task.note, task.id
                ),
                None => println!("Error: Task note is required."),
            }
        }
        Some(Commands::List) => {
            let tasks = service.tasks();
            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }

            let rows: Vec<TaskRow> = tasks
                .iter()
                .map(|task| TaskRow {
                    sequence_number: task.sequence_number,
                    id: task.id.to_string()[..8].to_string(),
                    status: task.status.label(),
                    note: task.note.clone(),
                })
                .collect();
            let mut table = Table::new(rows);
            table
                .with(Style::modern())
                .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
            println!("{}", table);

            let overview = service.overview();
            println!(
                "{} Total task(s): {} aborted, {} underway, {} completed",
                overview.total(),
                overview.aborted,
                overview.underway,
                overview.completed
            );
        }
        Some(Commands::Update {
            selector,
            note,
            status,
        }) => {
            let Some(task) = resolve(&service, &selector) else {
                println!("Task not found: {}", selector);
                return Ok(());
            };
            let note = note.unwrap_or_default();
            let status = status.unwrap_or(task.status);
            if service.update(&task, &note, status)? {
                let latest = service.get(&task.id).unwrap_or(task);
                println!(
                    "Task updated: #{} {} [{}]",
                    latest.sequence_number,
                    latest.note,
                    latest.status.label()
                );
            } else {
                println!("Task not found: {}", selector);
            }
        }
        Some(Commands::Delete { selector }) => {
            let Some(task) = resolve(&service, &selector) else {
                println!("Task not found: {}", selector);
                return Ok(());
            };
            if service.delete_one(&task)? {
                println!("Task deleted: #{} {}", task.sequence_number, task.note);
            } else {
                println!("Task not found: {}", selector);
            }
        }
        Some(Commands::Clear) => {
            let removed = service.delete_all()?;
            println!("Cleared {} task(s).", removed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_by_sequence_then_prefix() {
        let service = TaskService::new(Arc::new(TaskStore::in_memory()));
        let first = service.add("first").unwrap().unwrap();
        let second = service.add("second").unwrap().unwrap();

        assert_eq!(resolve(&service, "2").map(|t| t.id), Some(second.id));
        let prefix = first.id.to_string()[..8].to_string();
        assert_eq!(resolve(&service, &prefix).map(|t| t.id), Some(first.id));
        assert!(resolve(&service, "99").is_none());
    }

    #[test]
    fn status_flag_parses_labels() {
        assert_eq!(parse_status("Aborted"), Ok(Status::Aborted));
        assert!(parse_status("paused").is_err());
    }
}
