//! precis CLI - ask questions about web pages from the terminal
//!
//! This CLI provides a `precis` command that streams a model answer, calling
//! the URL summarization tool whenever the model asks for it.

mod commands;
mod config;
mod renderer;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{ask, chat, results};
use config::PrecisConfig;

/// precis - streaming answers grounded in page summaries
#[derive(Parser, Debug)]
#[command(
    name = "precis",
    author,
    version,
    about = "precis - streaming answers grounded in page summaries",
    long_about = "precis sends your question to an OpenAI-compatible model and lets it summarize\nthe web pages you mention while it answers."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Extra configuration file, applied after ~/.precis/config.toml and ./.precisrc
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model provider (universal, mock)
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a single question
    Ask {
        /// The question, URLs included
        prompt: String,

        /// Leave the answer section closed until the model itself writes text
        #[arg(long)]
        specific_model: bool,

        /// Print the final conversation history as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive session
    Chat {
        /// JSON file the conversation is loaded from and saved to
        #[arg(long)]
        history: Option<PathBuf>,

        /// Leave the answer section closed until the model itself writes text
        #[arg(long)]
        specific_model: bool,
    },

    /// Render a JSON list of search results as a card grid
    Results {
        /// File holding `[{title, link, snippet}, ...]`
        file: PathBuf,

        /// Show every result instead of the first page
        #[arg(long)]
        all: bool,
    },
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut cli_config = PrecisConfig::discover_and_load(args.config.as_deref())
        .context("Failed to load configuration")?
        .with_env_overrides(|key| std::env::var(key).ok());
    if let Some(provider) = args.provider {
        cli_config.model.provider = Some(provider);
    }

    // Logs go to stderr so stdout carries only the answer
    let level = args.log_level.as_deref().or(cli_config.log_level.as_deref()).map_or(Level::WARN, parse_level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // If no command provided, show help
    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    match command {
        Command::Ask { prompt, specific_model, json } => {
            ask::execute(&cli_config, prompt, specific_model, json).await?;
        }
        Command::Chat { history, specific_model } => {
            chat::execute(&cli_config, history, specific_model).await?;
        }
        Command::Results { file, all } => {
            results::execute(&file, all)?;
        }
    }

    Ok(())
}
