use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Page object model — the assembled output of the generation pipeline
// ============================================================================

/// Semantic role of a UI element, inferred from step verbs or declared
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Input,
    Button,
    Text,
    Link,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "input" => Some(Role::Input),
            "button" => Some(Role::Button),
            "text" => Some(Role::Text),
            "link" => Some(Role::Link),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Input => "input",
            Role::Button => "button",
            Role::Text => "text",
            Role::Link => "link",
        }
    }
}

/// Where an ElementSpec came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Declared verbatim in the instruction document
    Explicit,
    /// Derived from step text + DOM analysis
    Inferred,
}

/// One logical element: stable name, role, and an ordered selector candidate
/// list (most specific first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub name: String,
    pub role: Role,
    pub selectors: Vec<String>,
    pub provenance: Provenance,
}

impl ElementSpec {
    pub fn new(name: &str, role: Role) -> Self {
        ElementSpec {
            name: name.to_string(),
            role,
            selectors: Vec::new(),
            provenance: Provenance::Inferred,
        }
    }

    /// Append candidates that are not already present, preserving order.
    pub fn merge_selectors(&mut self, candidates: &[String]) {
        for c in candidates {
            if !self.selectors.contains(c) {
                self.selectors.push(c.clone());
            }
        }
    }
}

/// An assembled page: name plus its elements in first-occurrence order.
///
/// Immutable after assembly except for `promote_selector`, the single
/// rewrite the healing pass is allowed to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageObject {
    pub name: String,
    elements: Vec<ElementSpec>,
}

impl PageObject {
    pub fn new(name: &str, elements: Vec<ElementSpec>) -> Self {
        PageObject {
            name: name.to_string(),
            elements,
        }
    }

    pub fn elements(&self) -> &[ElementSpec] {
        &self.elements
    }

    pub fn element(&self, logical_name: &str) -> Option<&ElementSpec> {
        self.elements.iter().find(|e| e.name == logical_name)
    }

    pub fn element_names(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.name.as_str()).collect()
    }

    /// Replace an element's candidate list with `selectors`, putting the
    /// selector that worked first. Called only by the healing layer after a
    /// successful post-heal resolution.
    pub(crate) fn promote_selector(
        &mut self,
        logical_name: &str,
        winner: &str,
        regenerated: &[String],
    ) {
        if let Some(spec) = self.elements.iter_mut().find(|e| e.name == logical_name) {
            let mut rewritten = vec![winner.to_string()];
            for s in regenerated {
                if s != winner && !rewritten.contains(s) {
                    rewritten.push(s.clone());
                }
            }
            spec.selectors = rewritten;
        }
    }
}

// ============================================================================
// Page registry
// ============================================================================

/// Maps page name → PageObject for one generation run. Cloneable so each
/// scenario execution owns an independent copy (healing rewrites stay
/// scenario-local).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRegistry {
    pages: Vec<PageObject>,
}

impl PageRegistry {
    pub fn new() -> Self {
        PageRegistry { pages: Vec::new() }
    }

    /// Insert a page, replacing any previous entry with the same name.
    pub fn insert(&mut self, page: PageObject) {
        if let Some(existing) = self.pages.iter_mut().find(|p| p.name == page.name) {
            *existing = page;
        } else {
            self.pages.push(page);
        }
    }

    pub fn get(&self, name: &str) -> Result<&PageObject, CoreError> {
        self.pages
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| CoreError::UnknownPage {
                page: name.to_string(),
                step: None,
            })
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Result<&mut PageObject, CoreError> {
        self.pages
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| CoreError::UnknownPage {
                page: name.to_string(),
                step: None,
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pages.iter().any(|p| p.name == name)
    }

    /// Pages in insertion order (classification declaration order).
    pub fn pages(&self) -> &[PageObject] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
