//! `;`-joined event accumulator drained once per round.

use crate::scan::split;

/// Pending events of one turn, stored the way content writes them:
/// a single `;`-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQueue {
    events: String,
}

impl EventQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue seeded with `events`.
    pub fn with_events(events: impl Into<String>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Append `events`, separated from earlier ones by `;`.
    pub fn push(&mut self, events: &str) {
        if events.is_empty() {
            return;
        }
        if !self.events.is_empty() {
            self.events.push(';');
        }
        self.events.push_str(events);
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pending events as written.
    pub fn as_str(&self) -> &str {
        &self.events
    }

    /// Split into single events and clear the queue.
    pub fn take(&mut self) -> Vec<String> {
        let events = std::mem::take(&mut self.events);
        split(&events, ";")
            .into_iter()
            .filter(|event| !event.is_empty())
            .map(str::to_string)
            .collect()
    }
}
