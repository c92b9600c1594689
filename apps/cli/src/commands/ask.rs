//! One-shot question.

use colored::Colorize;
use precis_abstraction::ConversationMessage;

use super::build_orchestrator;
use crate::config::PrecisConfig;
use crate::renderer::run_turn;

/// Runs one orchestration turn for `prompt` against a fresh history.
///
/// With `json` the live output is suppressed and the final history is printed
/// as JSON instead.
pub async fn execute(
    config: &PrecisConfig,
    prompt: String,
    specific_model: bool,
    json: bool,
) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config, specific_model)?;
    let mut history = vec![ConversationMessage::user(prompt)];

    let outcome = run_turn(&orchestrator, &mut history, json).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
    }
    if outcome.cancelled {
        eprintln!("{}", "Cancelled".yellow());
    } else if outcome.has_error {
        eprintln!("{} Completed with errors", "⚠".yellow());
    }

    Ok(())
}
