use serde::{Deserialize, Serialize};

use crate::assemble::page_object::ElementSpec;

// ============================================================================
// Classification models
// ============================================================================

/// One row of the ordered classification rule table. Rules are evaluated in
/// declaration order; the first match is the step's primary page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl PageRule {
    /// Case-insensitive substring containment of any keyword in the step.
    pub fn matches(&self, step_text: &str) -> bool {
        let lower = step_text.to_lowercase();
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && lower.contains(&k.to_lowercase()))
    }
}

/// One classified page: its rule, the steps assigned to it (indices into the
/// flattened step list), and explicit elements if the page was declared with
/// an override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub name: String,
    pub keywords: Vec<String>,

    /// Indices of assigned steps, in step order. Cross-page steps appear in
    /// every matching page's list.
    pub step_indices: Vec<usize>,

    /// Explicit elements (override). `Some` means the assembler uses these
    /// verbatim and skips inference for this page.
    pub explicit_elements: Option<Vec<ElementSpec>>,
}

impl PageInfo {
    pub fn is_explicit(&self) -> bool {
        self.explicit_elements.is_some()
    }
}

/// Name of the implicit fallback page for steps matching no rule.
pub const FALLBACK_PAGE: &str = "generic";
