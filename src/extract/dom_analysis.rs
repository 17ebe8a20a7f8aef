use serde::{Deserialize, Serialize};

use crate::assemble::page_object::Role;

// ============================================================================
// DOM snapshot model
// ============================================================================

/// One flattened DOM node as reported by the browser bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomElement {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "ariaLabel")]
    pub aria_label: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

/// A flattened DOM snapshot: url, title and all elements in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomSnapshot {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "dom")]
    pub elements: Vec<DomElement>,
}

impl DomSnapshot {
    pub fn empty() -> Self {
        DomSnapshot {
            url: None,
            title: String::new(),
            elements: Vec::new(),
        }
    }
}

// ============================================================================
// DOM analysis — selector candidate derivation
// ============================================================================

/// One analyzable element: accessible name, inferred role, and an ordered
/// list of selector candidates (most specific attribute first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCandidate {
    pub name: String,
    pub role: Role,
    pub selectors: Vec<String>,
}

/// Derives element candidates from a DOM snapshot.
///
/// Implemented by the built-in heuristic analyzer; a trait so tests and
/// alternative analyzers can stand in.
pub trait DomAnalysis {
    fn analyze(&self, snapshot: &DomSnapshot) -> Vec<ElementCandidate>;
}

/// Attribute-based analyzer. Selector candidate order per element:
/// `#id` > `[name=...]` > `[placeholder*=...]` > bare `tag[type=...]`.
pub struct HeuristicAnalyzer;

impl DomAnalysis for HeuristicAnalyzer {
    fn analyze(&self, snapshot: &DomSnapshot) -> Vec<ElementCandidate> {
        snapshot
            .elements
            .iter()
            .filter(|el| !el.disabled)
            .filter_map(to_candidate)
            .collect()
    }
}

/// Candidates whose role matches, in snapshot order.
pub fn candidates_for_role(candidates: &[ElementCandidate], role: Role) -> Vec<&ElementCandidate> {
    candidates.iter().filter(|c| c.role == role).collect()
}

fn to_candidate(el: &DomElement) -> Option<ElementCandidate> {
    let role = infer_role(el)?;
    let name = accessible_name(el, role)?;
    let selectors = selector_candidates(el);
    if selectors.is_empty() {
        return None;
    }
    Some(ElementCandidate {
        name,
        role,
        selectors,
    })
}

/// Map a DOM node to one of the four logical roles, or None for nodes the
/// pipeline never targets (divs, scripts, form chrome).
fn infer_role(el: &DomElement) -> Option<Role> {
    match el.tag.as_str() {
        "input" | "textarea" | "select" => match el.r#type.as_deref() {
            Some("submit") | Some("button") | Some("image") => Some(Role::Button),
            Some("hidden") => None,
            _ => Some(Role::Input),
        },
        "button" => Some(Role::Button),
        "a" => Some(Role::Link),
        "label" | "legend" | "option" | "script" | "style" => None,
        _ => {
            let has_text = el.text.as_deref().map(|t| t.trim().len() > 2).unwrap_or(false);
            if has_text { Some(Role::Text) } else { None }
        }
    }
}

/// Best human-readable identifier for matching against logical names.
/// Text nodes are identified by what they display; widgets by their
/// attributes first.
fn accessible_name(el: &DomElement, role: Role) -> Option<String> {
    let ordered: [&Option<String>; 5] = match role {
        Role::Text => [&el.aria_label, &el.text, &el.name, &el.id, &el.placeholder],
        _ => [&el.aria_label, &el.name, &el.id, &el.placeholder, &el.text],
    };

    ordered
        .into_iter()
        .filter_map(|s| s.as_deref())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// Ordered selector candidates for one element, most specific first.
pub fn selector_candidates(el: &DomElement) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(id) = el.id.as_deref().filter(|s| !s.is_empty()) {
        out.push(format!("#{}", id));
    }
    if let Some(name) = el.name.as_deref().filter(|s| !s.is_empty()) {
        out.push(format!("{}[name=\"{}\"]", el.tag, name));
    }
    if let Some(ph) = el.placeholder.as_deref().filter(|s| !s.is_empty()) {
        out.push(format!("{}[placeholder*=\"{}\"]", el.tag, ph));
    }
    match el.r#type.as_deref().filter(|s| !s.is_empty()) {
        Some(t) => out.push(format!("{}[type=\"{}\"]", el.tag, t)),
        None => {
            // Generic tag fallback only when nothing better exists
            if out.is_empty() {
                out.push(el.tag.clone());
            }
        }
    }

    out
}
