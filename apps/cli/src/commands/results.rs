//! Search-result grid.
//!
//! Renders `{title, link, snippet}` records as compact cards, three at a time,
//! with a "View N more" control standing in for the hidden rest.

use anyhow::Context;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Cards shown before the "View N more" control.
pub const PAGE_SIZE: usize = 3;

/// Lines of snippet shown per card.
const SNIPPET_LINES: usize = 2;

const CARD_WIDTH: usize = 48;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchResult {
    /// Hostname of the link, or the raw link when it does not parse.
    pub fn hostname(&self) -> String {
        Url::parse(&self.link)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.link.clone())
    }
}

/// Grid state: the result list plus whether it has been expanded.
#[derive(Debug, Clone)]
pub struct ResultGrid<'a> {
    results: &'a [SearchResult],
    expanded: bool,
}

impl<'a> ResultGrid<'a> {
    pub fn new(results: &'a [SearchResult]) -> Self {
        Self { results, expanded: false }
    }

    /// Shows every result. There is no way back.
    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn visible(&self) -> &'a [SearchResult] {
        if self.expanded { self.results } else { &self.results[..self.results.len().min(PAGE_SIZE)] }
    }

    /// Results hidden behind the "View N more" control.
    pub fn hidden_count(&self) -> usize {
        if self.expanded { 0 } else { self.results.len().saturating_sub(PAGE_SIZE) }
    }

    /// Plain-text rendering, one card per block.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for result in self.visible() {
            for line in clamp_lines(&result.snippet, CARD_WIDTH, SNIPPET_LINES) {
                out.push_str(&format!("│ {line}\n"));
            }
            out.push_str(&format!("└ {}\n", result.hostname()));
        }
        let hidden = self.hidden_count();
        if hidden > 0 {
            out.push_str(&format!("[ View {hidden} more ]\n"));
        }
        out
    }
}

/// Word-wraps `text` to `width` columns and keeps at most `max_lines` lines.
///
/// A truncated last line ends with an ellipsis.
pub fn clamp_lines(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() { word.chars().count() } else { current.chars().count() + 1 + word.chars().count() };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}

pub fn load_results(path: &Path) -> anyhow::Result<Vec<SearchResult>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse results file {}", path.display()))
}

/// Execute the results command.
pub fn execute(path: &Path, all: bool) -> anyhow::Result<()> {
    let results = load_results(path)?;
    let mut grid = ResultGrid::new(&results);
    if all {
        grid.expand();
    }

    if results.is_empty() {
        println!("{}", "No results".dimmed());
        return Ok(());
    }

    for block in grid.render().split_inclusive('\n') {
        if block.starts_with("[ View") {
            print!("{}", block.cyan());
        } else if let Some(host) = block.strip_prefix("└ ") {
            print!("└ {}", host.dimmed());
        } else {
            print!("{block}");
        }
    }
    Ok(())
}
