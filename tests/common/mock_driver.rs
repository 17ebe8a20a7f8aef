use std::cell::RefCell;
use std::sync::Mutex;

use page_forge::browser::driver::{Driver, ElementHandle};
use page_forge::error::CoreError;
use page_forge::extract::dom_analysis::DomSnapshot;
use page_forge::runtime::events::{HealingEvent, HealingSink};

// ============================================================================
// Mock driver — scripted DOM presence, no browser
// ============================================================================

/// A driver over a static list of "present" selectors plus a snapshot to
/// serve on healing. Records every find/action for assertions.
pub struct MockDriver {
    /// Selectors that `find` reports present
    pub present: Vec<String>,
    /// Snapshot served to the healing pass
    pub snapshot: DomSnapshot,
    /// Every selector passed to `find`, in order
    pub find_calls: RefCell<Vec<String>>,
    /// Number of snapshot (healing) fetches
    pub snapshot_calls: RefCell<usize>,
    /// (action, selector) pairs for click/set_value/text/is_displayed
    pub actions: RefCell<Vec<(String, String)>>,
    /// When true, every action on a resolved handle fails
    pub fail_actions: bool,
}

impl MockDriver {
    pub fn new(present: &[&str], snapshot: DomSnapshot) -> Self {
        MockDriver {
            present: present.iter().map(|s| s.to_string()).collect(),
            snapshot,
            find_calls: RefCell::new(Vec::new()),
            snapshot_calls: RefCell::new(0),
            actions: RefCell::new(Vec::new()),
            fail_actions: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(&[], DomSnapshot::empty())
    }
}

impl Driver for MockDriver {
    fn find(&mut self, selector: &str, _timeout_ms: u64) -> Result<Option<ElementHandle>, CoreError> {
        self.find_calls.borrow_mut().push(selector.to_string());
        if self.present.iter().any(|s| s == selector) {
            Ok(Some(ElementHandle::new(selector)))
        } else {
            Ok(None)
        }
    }

    fn click(&mut self, handle: &ElementHandle) -> Result<(), CoreError> {
        self.record("click", handle)
    }

    fn set_value(&mut self, handle: &ElementHandle, _value: &str) -> Result<(), CoreError> {
        self.record("set_value", handle)
    }

    fn text(&mut self, handle: &ElementHandle) -> Result<String, CoreError> {
        self.record("text", handle)?;
        Ok("mock text".into())
    }

    fn is_displayed(&mut self, handle: &ElementHandle) -> Result<bool, CoreError> {
        self.record("is_displayed", handle)?;
        Ok(true)
    }

    fn snapshot(&mut self) -> Result<DomSnapshot, CoreError> {
        *self.snapshot_calls.borrow_mut() += 1;
        Ok(self.snapshot.clone())
    }

    fn navigate(&mut self, _url: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

impl MockDriver {
    fn record(&self, action: &str, handle: &ElementHandle) -> Result<(), CoreError> {
        self.actions
            .borrow_mut()
            .push((action.to_string(), handle.selector.clone()));
        if self.fail_actions {
            return Err(CoreError::SessionProtocol {
                command: action.to_string(),
                detail: "scripted failure".into(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Recording healing sink
// ============================================================================

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<HealingEvent>>,
}

impl RecordingSink {
    pub fn snapshot(&self) -> Vec<HealingEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl HealingSink for RecordingSink {
    fn emit(&self, event: &HealingEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Boxable handle to a shared RecordingSink (the resolver owns its sink).
pub struct SharedSink(pub std::sync::Arc<RecordingSink>);

impl HealingSink for SharedSink {
    fn emit(&self, event: &HealingEvent) {
        self.0.emit(event);
    }
}
