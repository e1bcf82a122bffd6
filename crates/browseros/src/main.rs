// SPDX-FileCopyrightText: 2026 BrowserOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BrowserOS chat memory CLI.
//!
//! Inspects and edits the persisted conversation an agent will restore on
//! its next start.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod chat;
mod status;

use std::path::PathBuf;

use browseros_config::BrowserOsConfig;
use browseros_core::MessageKind;
use clap::{Parser, Subcommand};

/// BrowserOS chat memory tool.
#[derive(Parser, Debug)]
#[command(name = "browseros", version, about, long_about = None)]
struct Cli {
    /// Conversation to operate on (overrides `chat_memory.conversation_id`).
    #[arg(long, global = true)]
    conversation: Option<String>,

    /// SQLite database file (overrides `chat_memory.database_path`).
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the stored conversation.
    Show {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Append a message to the conversation.
    Append {
        /// Message kind: system, human, ai, tool, browser_state or todo_list.
        #[arg(long, default_value = "human", value_parser = parse_kind)]
        role: MessageKind,
        /// Treat the content as JSON and store it as structured content.
        #[arg(long)]
        json: bool,
        /// Tool call this message answers (tool messages only).
        #[arg(long)]
        tool_call_id: Option<String>,
        /// Message text.
        content: String,
    },
    /// Delete every stored message of the conversation.
    Clear,
    /// Show backend health and conversation statistics.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// List stored conversations.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved configuration as TOML.
    Config,
}

fn parse_kind(value: &str) -> Result<MessageKind, String> {
    value.parse::<MessageKind>().map_err(|_| {
        format!(
            "unknown role `{value}` (expected system, human, ai, tool, browser_state or todo_list)"
        )
    })
}

/// Conversation and database after applying command-line overrides.
#[derive(Debug, Clone)]
pub struct Target {
    pub conversation_id: String,
    pub database_path: PathBuf,
}

impl Target {
    fn resolve(cli: &Cli, config: &BrowserOsConfig) -> Self {
        Self {
            conversation_id: cli
                .conversation
                .clone()
                .unwrap_or_else(|| config.chat_memory.conversation_id()),
            database_path: cli
                .database
                .clone()
                .unwrap_or_else(|| config.chat_memory.database_path()),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match browseros_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            browseros_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging.level);

    let target = Target::resolve(&cli, &config);
    let result = match cli.command {
        Some(Commands::Show { json, plain }) => chat::run_show(&config, &target, json, plain).await,
        Some(Commands::Append {
            role,
            json,
            tool_call_id,
            content,
        }) => chat::run_append(&config, &target, role, &content, json, tool_call_id).await,
        Some(Commands::Clear) => chat::run_clear(&config, &target).await,
        Some(Commands::Status { json, plain }) => {
            status::run_status(&config, &target, json, plain).await
        }
        Some(Commands::List { json }) => status::run_list(&target, json).await,
        Some(Commands::Config) => print_config(&config, &target),
        None => {
            println!("browseros: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("browseros: {e}");
        std::process::exit(1);
    }
}

fn print_config(
    config: &BrowserOsConfig,
    target: &Target,
) -> Result<(), browseros_core::MemoryError> {
    let mut resolved = config.clone();
    resolved.chat_memory.conversation_id = Some(target.conversation_id.clone());
    resolved.chat_memory.database_path = Some(target.database_path.display().to_string());
    let text = toml::to_string_pretty(&resolved)
        .map_err(|e| browseros_core::MemoryError::Config(e.to_string()))?;
    print!("{text}");
    Ok(())
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("browseros={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
