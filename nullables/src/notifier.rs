//! Nullable notifier that records lifecycle events.

use factfund_client::{Notifier, OperationEvent};
use std::cell::RefCell;

#[derive(Default)]
pub struct RecordingNotifier {
    events: RefCell<Vec<OperationEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<OperationEvent> {
        self.events.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &OperationEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
