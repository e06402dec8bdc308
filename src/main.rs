// src/main.rs
// Taskpilot CLI - run enrichment operations from the command line

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use taskpilot::config::Settings;
use taskpilot::enrich::{ChatRequest, ChatTurn, Subtask, TaskBrief, TaskSnapshot};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "taskpilot")]
#[command(about = "AI enrichment for tasks: subtasks, priority, estimates, tags and chat")]
#[command(version)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TaskArgs {
    /// Task title
    #[arg(short, long)]
    title: String,

    /// Task description
    #[arg(short, long, default_value = "")]
    description: String,
}

impl TaskArgs {
    fn brief(&self) -> TaskBrief {
        TaskBrief::new(self.title.clone(), self.description.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate 3-5 actionable subtasks
    Subtasks(TaskArgs),

    /// Suggest a priority (low, medium, high)
    Priority(TaskArgs),

    /// Estimate minutes needed
    Estimate {
        #[command(flatten)]
        task: TaskArgs,

        /// Subtask title to include as context (repeatable)
        #[arg(short, long = "subtask")]
        subtasks: Vec<String>,
    },

    /// Suggest 2-3 tags
    Tags(TaskArgs),

    /// Turn free text into a structured task
    Parse {
        /// Natural-language description of the task
        #[arg(long)]
        text: String,
    },

    /// Ask the productivity assistant
    Chat {
        #[arg(short, long)]
        message: String,

        /// JSON file with prior turns: [{"role": "user", "content": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,

        /// Your name, used by the assistant
        #[arg(short, long)]
        name: Option<String>,

        /// Title of the task the question is about
        #[arg(long)]
        task_title: Option<String>,

        /// Description of the task the question is about
        #[arg(long, default_value = "")]
        task_description: String,
    },

    /// Subtasks, priority, estimate and tags at once
    Analyze(TaskArgs),
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_history(path: &Path) -> Result<Vec<ChatTurn>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid history file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env files (global first, then current directory)
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".taskpilot/.env"));
    }
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase())),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let enricher = Settings::load().enricher();

    match cli.command {
        Commands::Subtasks(task) => print_json(&enricher.generate_subtasks(&task.brief()).await?)?,
        Commands::Priority(task) => print_json(&enricher.suggest_priority(&task.brief()).await?)?,
        Commands::Estimate { task, subtasks } => {
            let subtasks: Vec<Subtask> = subtasks.into_iter().map(Subtask::new).collect();
            print_json(&enricher.estimate_time(&task.brief(), &subtasks).await?)?
        }
        Commands::Tags(task) => print_json(&enricher.auto_tag(&task.brief()).await?)?,
        Commands::Parse { text } => print_json(&enricher.parse_natural_language(&text).await?)?,
        Commands::Chat {
            message,
            history,
            name,
            task_title,
            task_description,
        } => {
            let history = match history {
                Some(path) => read_history(&path)?,
                None => Vec::new(),
            };
            let context = task_title.map(|title| TaskSnapshot {
                title,
                description: task_description,
            });
            let mut request = ChatRequest::new(message)
                .with_history(history)
                .with_task_context(context);
            request.user_display_name = name;
            println!("{}", enricher.chat(&request).await?);
        }
        Commands::Analyze(task) => print_json(&enricher.analyze_task(&task.brief()).await?)?,
    }

    Ok(())
}
