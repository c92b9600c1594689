//! Interactive chat session.
//!
//! History persists across turns in memory and, with `--history`, in a JSON file
//! that is loaded at start and rewritten after every turn.

use anyhow::Context;
use colored::Colorize;
use precis_abstraction::ConversationMessage;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::build_orchestrator;
use crate::config::PrecisConfig;
use crate::renderer::run_turn;

/// Reads a saved history; a missing file starts an empty one.
pub fn load_history(path: &Path) -> anyhow::Result<Vec<ConversationMessage>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file {}", path.display()))
}

pub fn save_history(path: &Path, history: &[ConversationMessage]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(history)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write history file {}", path.display()))
}

/// Execute the chat command.
pub async fn execute(
    config: &PrecisConfig,
    history_path: Option<PathBuf>,
    specific_model: bool,
) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config, specific_model)?;
    let mut history = match &history_path {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };

    println!("{}", "precis chat".bold().cyan());
    println!("{}", "Paste a URL and ask about it. Type 'exit' to quit, Ctrl-C cancels a reply.".dimmed());
    if !history.is_empty() {
        println!("{}", format!("Resumed {} messages", history.len()).dimmed());
    }

    loop {
        print!("\n{} ", ">".green().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        history.push(ConversationMessage::user(input));
        let outcome = run_turn(&orchestrator, &mut history, false).await;

        if outcome.cancelled {
            println!("{}", "(cancelled)".yellow());
        }
        info!(
            turn_messages = history.len(),
            has_error = outcome.has_error,
            tool_ran = outcome.tool_ran(),
            "Chat turn finished"
        );

        if let Some(path) = &history_path {
            save_history(path, &history)?;
        }
    }

    println!("\nGoodbye!");
    Ok(())
}
