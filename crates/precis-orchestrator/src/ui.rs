//! Ordered UI sections announced during a run.
//!
//! A run describes its visible layout as a list of sections: badges for tool
//! calls, loading placeholders, inline error notices and the answer area that
//! the display buffer text is rendered into.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// One visible block of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum UiSection {
    /// Area the live answer text is rendered into.
    Answer,
    /// Compact badge naming a tool and its argument.
    ToolBadge { tool: String, argument: String },
    /// Placeholder shown while a tool runs.
    Loading,
    /// Inline error notice.
    ErrorNotice(String),
}

/// Publishes the ordered section list to any number of readers.
#[derive(Debug)]
pub struct UiStream {
    tx: watch::Sender<Vec<UiSection>>,
}

impl Default for UiStream {
    fn default() -> Self {
        Self::new()
    }
}

impl UiStream {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx }
    }

    /// Appends a new section.
    pub fn append(&self, section: UiSection) {
        self.tx.send_modify(|sections| sections.push(section));
    }

    /// Replaces the most recent section, or appends when there is none.
    pub fn update(&self, section: UiSection) {
        self.tx.send_modify(|sections| match sections.last_mut() {
            Some(last) => *last = section,
            None => sections.push(section),
        });
    }

    /// Makes sure the answer section is shown.
    ///
    /// A trailing loading placeholder is taken over by the answer. Returns
    /// `true` only when the answer section was created by this call.
    pub fn materialize_answer(&self) -> bool {
        let mut created = false;
        self.tx.send_if_modified(|sections| {
            let trailing_loading = sections.last() == Some(&UiSection::Loading);
            if sections.contains(&UiSection::Answer) {
                if trailing_loading {
                    sections.pop();
                    return true;
                }
                return false;
            }
            if trailing_loading {
                sections.pop();
            }
            sections.push(UiSection::Answer);
            created = true;
            true
        });
        created
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<UiSection>> {
        self.tx.subscribe()
    }

    /// Current section list.
    pub fn sections(&self) -> Vec<UiSection> {
        self.tx.borrow().clone()
    }

    /// Number of answer sections currently shown.
    pub fn answer_count(&self) -> usize {
        self.tx.borrow().iter().filter(|s| **s == UiSection::Answer).count()
    }
}
