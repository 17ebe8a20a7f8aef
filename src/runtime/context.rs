use crate::assemble::page_object::{PageObject, PageRegistry};
use crate::error::CoreError;

// ============================================================================
// PageContextManager — the "current page" cursor for one scenario
// ============================================================================

/// Tracks which page a running scenario is on.
///
/// One instance per scenario execution, owning its own registry copy, so
/// concurrent scenarios never share cursor state and healing rewrites stay
/// scenario-local. There is no history: navigation is driven externally by
/// step definitions calling `set_current_page` where a page change is
/// expected.
#[derive(Debug, Clone)]
pub struct PageContextManager {
    registry: PageRegistry,
    current: Option<String>,
}

impl PageContextManager {
    pub fn new(registry: PageRegistry) -> Self {
        PageContextManager {
            registry,
            current: None,
        }
    }

    /// Move the cursor to the named page. Fails with UnknownPage if the
    /// name is not in the registry; the cursor is left unchanged.
    pub fn set_current_page(&mut self, name: &str) -> Result<(), CoreError> {
        if !self.registry.contains(name) {
            return Err(CoreError::UnknownPage {
                page: name.to_string(),
                step: None,
            });
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    /// The active page. Fails with NoActivePage before the first
    /// `set_current_page`.
    pub fn get_current_page(&self) -> Result<&PageObject, CoreError> {
        match &self.current {
            Some(name) => self.registry.get(name),
            None => Err(CoreError::NoActivePage { step: None }),
        }
    }

    pub(crate) fn get_current_page_mut(&mut self) -> Result<&mut PageObject, CoreError> {
        match self.current.clone() {
            Some(name) => self.registry.get_mut(&name),
            None => Err(CoreError::NoActivePage { step: None }),
        }
    }

    /// Direct registry lookup, independent of the cursor.
    pub fn get_page(&self, name: &str) -> Result<&PageObject, CoreError> {
        self.registry.get(name)
    }

    /// Name of the active page, if any.
    pub fn current_page_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }
}
