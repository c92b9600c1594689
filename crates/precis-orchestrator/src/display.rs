//! Live display buffer.
//!
//! The orchestrator is the only writer. Readers see the latest published text
//! and may skip intermediate values.

use tokio::sync::watch;

/// Single-writer, multi-reader channel carrying the accumulated answer text.
#[derive(Debug)]
pub struct DisplayBuffer {
    tx: watch::Sender<String>,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBuffer {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(String::new());
        Self { tx }
    }

    /// Replaces the published text. Never blocks, even with no readers.
    pub fn publish(&self, text: &str) {
        self.tx.send_replace(text.to_string());
    }

    /// Returns a receiver that observes every later publication.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// Last published text.
    pub fn latest(&self) -> String {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reader_sees_latest_value() {
        let buffer = DisplayBuffer::new();
        let mut rx = buffer.subscribe();

        buffer.publish("Hel");
        buffer.publish("Hello");

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "Hello");
        assert_eq!(buffer.latest(), "Hello");
    }

    #[test]
    fn test_publish_without_readers() {
        let buffer = DisplayBuffer::default();
        buffer.publish("nobody listening");
        assert_eq!(buffer.latest(), "nobody listening");
    }
}
