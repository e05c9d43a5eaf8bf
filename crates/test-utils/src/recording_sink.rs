use std::sync::{Arc, Mutex};

use procrun::hooks::{Category, OutputSink};

/// A sink that records every event it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<(Category, String)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far.
    pub fn events(&self) -> Vec<(Category, String)> {
        self.events.lock().unwrap().clone()
    }

    /// Messages received for one category.
    pub fn messages(&self, category: Category) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == category)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, category: Category, needle: &str) -> bool {
        self.messages(category).iter().any(|m| m.contains(needle))
    }
}

impl OutputSink for RecordingSink {
    fn emit(&self, category: Category, message: &str) {
        self.events.lock().unwrap().push((category, message.to_string()));
    }
}
