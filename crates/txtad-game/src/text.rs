//! Printable texts that may raise events when shown.

use std::cell::RefCell;
use std::rc::Rc;

use txtad_core::EventSink;

use crate::content::TextSpec;

/// A text shared between the game and users.
pub type SharedText = Rc<RefCell<Text>>;

/// A text with the events it raises when printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    txt: String,
    one_time_events: String,
    permanent_events: String,
    shared: bool,
}

impl Text {
    /// Shared text that raises no events.
    pub fn new(txt: impl Into<String>) -> Self {
        Self {
            txt: txt.into(),
            one_time_events: String::new(),
            permanent_events: String::new(),
            shared: true,
        }
    }

    /// Events raised only the first time the text is printed.
    pub fn with_one_time_events(mut self, events: impl Into<String>) -> Self {
        self.one_time_events = events.into();
        self
    }

    /// Events raised every time the text is printed.
    pub fn with_permanent_events(mut self, events: impl Into<String>) -> Self {
        self.permanent_events = events.into();
        self
    }

    /// Set whether users share this text or get their own copy.
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    /// Wrap into a [`SharedText`].
    pub fn into_shared(self) -> SharedText {
        Rc::new(RefCell::new(self))
    }

    /// The raw text.
    pub fn txt(&self) -> &str {
        &self.txt
    }

    /// Whether users share this text.
    pub fn shared(&self) -> bool {
        self.shared
    }

    /// Return the text after emitting the permanent and then the one-time
    /// events. One-time events are gone afterwards.
    pub fn print(&mut self, sink: &dyn EventSink) -> String {
        sink.emit(&self.permanent_events);
        sink.emit(&std::mem::take(&mut self.one_time_events));
        self.txt.clone()
    }
}

impl From<&TextSpec> for Text {
    fn from(spec: &TextSpec) -> Self {
        Text::new(spec.txt.as_str())
            .with_one_time_events(spec.one_time_events.as_str())
            .with_permanent_events(spec.permanent_events.as_str())
            .with_shared(spec.shared)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use txtad_core::EventQueue;

    use super::*;

    #[test]
    fn one_time_events_fire_once() {
        let queue = RefCell::new(EventQueue::with_events("look"));
        let mut text = Text::new("A dusty hall.")
            .with_one_time_events("#sa player.seen_hall = 1")
            .with_permanent_events("#> {rooms/hall->desc}");

        assert_eq!(text.print(&queue), "A dusty hall.");
        assert_eq!(
            queue.borrow().as_str(),
            "look;#> {rooms/hall->desc};#sa player.seen_hall = 1"
        );

        queue.borrow_mut().take();
        assert_eq!(text.print(&queue), "A dusty hall.");
        assert_eq!(queue.borrow().as_str(), "#> {rooms/hall->desc}");
    }

    #[test]
    fn plain_text_raises_nothing() {
        let queue = RefCell::new(EventQueue::new());
        let mut text = Text::new("Hi");
        assert_eq!(text.print(&queue), "Hi");
        assert!(queue.borrow().is_empty());
    }

    #[test]
    fn from_spec_keeps_flags() {
        let spec = TextSpec {
            txt: "x".into(),
            one_time_events: "a".into(),
            permanent_events: String::new(),
            shared: false,
        };
        let text = Text::from(&spec);
        assert!(!text.shared());
        assert_eq!(text.txt(), "x");
    }
}
