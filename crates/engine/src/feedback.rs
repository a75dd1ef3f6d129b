use std::cell::RefCell;
use std::rc::Rc;

use tracing::info;

/// One-way channel for player-facing messages.
pub trait FeedbackSink {
    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFeedback;

impl FeedbackSink for TracingFeedback {
    fn notify(&mut self, message: &str) {
        info!(message = %message, "feedback");
    }
}

/// Keeps every message; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct FeedbackRecorder {
    messages: Rc<RefCell<Vec<String>>>,
}

impl FeedbackRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn take(&self) -> Vec<String> {
        self.messages.borrow_mut().drain(..).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .borrow()
            .iter()
            .any(|message| message.contains(needle))
    }
}

impl FeedbackSink for FeedbackRecorder {
    fn notify(&mut self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_clones_share_messages() {
        let recorder = FeedbackRecorder::new();
        let mut sink: Box<dyn FeedbackSink> = Box::new(recorder.clone());
        sink.notify("Clicked [Sofa]");
        sink.notify("Picked up [Photo Half A]");
        assert!(recorder.contains("Photo Half A"));
        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.messages().is_empty());
    }
}
