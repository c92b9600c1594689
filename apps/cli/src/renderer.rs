//! Live terminal rendering of a run.
//!
//! Follows the UI section list and the display buffer while a run is in
//! flight and prints only what changed since the last frame.

use colored::Colorize;
use precis_abstraction::ConversationMessage;
use precis_orchestrator::{
    CancellationToken, DisplayBuffer, RunOutcome, SummarizeOrchestrator, UiSection, UiStream,
};
use std::io::{self, Write};
use tokio::sync::watch;
use tracing::debug;

/// Tracks what has already been printed.
#[derive(Debug, Default)]
pub struct Renderer {
    sections: Vec<UiSection>,
    text: String,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines for sections that are new or were replaced since the last call.
    pub fn section_lines(&mut self, sections: &[UiSection]) -> Vec<String> {
        let mut lines = Vec::new();
        for (idx, section) in sections.iter().enumerate() {
            if self.sections.get(idx) == Some(section) {
                continue;
            }
            if let Some(line) = section_line(section) {
                lines.push(line);
            }
        }
        self.sections = sections.to_vec();
        lines
    }

    /// Text appended to the answer since the last call.
    pub fn text_delta(&mut self, text: &str) -> Option<String> {
        let delta = match text.strip_prefix(self.text.as_str()) {
            Some(rest) => rest.to_string(),
            // Never expected: the answer text only grows
            None => format!("\n{text}"),
        };
        self.text = text.to_string();
        (!delta.is_empty()).then_some(delta)
    }

    /// Prints changes until `done` fires, then prints the final state once more.
    pub async fn follow(
        &mut self,
        mut ui_rx: watch::Receiver<Vec<UiSection>>,
        mut text_rx: watch::Receiver<String>,
        done: &CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                () = done.cancelled() => break,
                Ok(()) = ui_rx.changed() => {
                    let sections = ui_rx.borrow_and_update().clone();
                    self.print_sections(&sections);
                }
                Ok(()) = text_rx.changed() => {
                    let text = text_rx.borrow_and_update().clone();
                    self.print_text(&text);
                }
            }
        }

        let sections = ui_rx.borrow().clone();
        self.print_sections(&sections);
        let text = text_rx.borrow().clone();
        self.print_text(&text);
        println!();
    }

    fn print_sections(&mut self, sections: &[UiSection]) {
        for line in self.section_lines(sections) {
            if !self.text.is_empty() && !self.text.ends_with('\n') {
                println!();
            }
            println!("{line}");
        }
    }

    fn print_text(&mut self, text: &str) {
        if let Some(delta) = self.text_delta(text) {
            print!("{delta}");
            if let Err(e) = io::stdout().flush() {
                debug!(error = %e, "Failed to flush stdout");
            }
        }
    }
}

fn section_line(section: &UiSection) -> Option<String> {
    match section {
        UiSection::Answer => None,
        UiSection::ToolBadge { tool, argument } => {
            Some(format!("  {} {} {}", "🔧".cyan(), tool.cyan().bold(), argument.dimmed()))
        }
        UiSection::Loading => Some(format!("  {} {}", "⏳".yellow(), "working...".dimmed())),
        UiSection::ErrorNotice(message) => Some(format!("  {} {}", "✗".red(), message.red())),
    }
}

/// Runs one orchestration turn while rendering it live.
///
/// Ctrl-C cancels the turn; history is still appended. With `quiet` nothing is
/// printed while the run is in flight.
pub async fn run_turn(
    orchestrator: &SummarizeOrchestrator,
    history: &mut Vec<ConversationMessage>,
    quiet: bool,
) -> RunOutcome {
    let ui = UiStream::new();
    let display = DisplayBuffer::new();
    let cancel = CancellationToken::new();
    let done = CancellationToken::new();
    let ui_rx = ui.subscribe();
    let text_rx = display.subscribe();

    let run = async {
        let outcome = orchestrator.run_with_cancel(history, &ui, &display, &cancel).await;
        done.cancel();
        outcome
    };

    let interrupt = async {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    debug!("Interrupt received, cancelling run");
                    cancel.cancel();
                }
            }
            () = done.cancelled() => {}
        }
    };

    let render = async {
        if !quiet {
            Renderer::new().follow(ui_rx, text_rx, &done).await;
        }
    };

    let (outcome, (), ()) = tokio::join!(run, interrupt, render);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_delta_prints_only_new_text() {
        let mut renderer = Renderer::new();
        assert_eq!(renderer.text_delta("Hel").as_deref(), Some("Hel"));
        assert_eq!(renderer.text_delta("Hello").as_deref(), Some("lo"));
        assert_eq!(renderer.text_delta("Hello"), None);
    }

    #[test]
    fn test_section_lines_follow_replacements() {
        colored::control::set_override(false);
        let mut renderer = Renderer::new();
        let badge = UiSection::ToolBadge {
            tool: "summarize".to_string(),
            argument: "https://example.com".to_string(),
        };

        let lines = renderer.section_lines(&[badge.clone(), UiSection::Loading]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("summarize https://example.com"));

        // Loading replaced by an error notice
        let lines = renderer.section_lines(&[badge.clone(), UiSection::ErrorNotice("failed".to_string())]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("failed"));

        // Answer sections print nothing themselves
        assert!(renderer.section_lines(&[badge, UiSection::Answer]).is_empty());
    }
}
