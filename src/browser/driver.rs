use crate::error::CoreError;
use crate::extract::dom_analysis::DomSnapshot;

// ============================================================================
// Driver trait — the seam between the resolver and a live browser
// ============================================================================

/// A resolved live element. Addressed by the selector that found it; the
/// bridge re-targets by selector on each action, which keeps handles cheap
/// and the protocol stateless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub selector: String,
}

impl ElementHandle {
    pub fn new(selector: &str) -> Self {
        ElementHandle {
            selector: selector.to_string(),
        }
    }
}

/// Minimal browser surface the runtime needs. Implemented by
/// `BrowserSession` for real runs and by mock drivers in tests. Lifecycle
/// beyond launch/quit is managed outside the core.
pub trait Driver {
    /// Wait up to `timeout_ms` for `selector` to be present. `Ok(None)`
    /// means a clean miss; `Err` means the bridge itself failed.
    fn find(&mut self, selector: &str, timeout_ms: u64) -> Result<Option<ElementHandle>, CoreError>;

    fn click(&mut self, handle: &ElementHandle) -> Result<(), CoreError>;

    fn set_value(&mut self, handle: &ElementHandle, value: &str) -> Result<(), CoreError>;

    fn text(&mut self, handle: &ElementHandle) -> Result<String, CoreError>;

    fn is_displayed(&mut self, handle: &ElementHandle) -> Result<bool, CoreError>;

    /// Fresh, non-cached DOM snapshot of the current page. Used by the
    /// healing pass, which must never see stale state.
    fn snapshot(&mut self) -> Result<DomSnapshot, CoreError>;

    fn navigate(&mut self, url: &str) -> Result<(), CoreError>;
}
