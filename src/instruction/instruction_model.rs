use serde::{Deserialize, Serialize};

// ============================================================================
// InstructionSet input document
// ============================================================================

/// The user-supplied instruction document. Either `test_cases` with free-text
/// steps (auto-detected pages) or `pages` with explicit element lists
/// (bypasses auto-detection for those pages) — or both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstructionSet {
    /// Project name, used for artifact headers and feature titles
    pub project: String,

    /// Base URL the generated tests run against
    pub url: String,

    #[serde(default)]
    pub test_cases: Vec<TestCase>,

    #[serde(default)]
    pub pages: Vec<PageDecl>,
}

/// One named scenario: an ordered list of free-text steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub steps: Vec<Step>,
}

/// One scenario step: raw text plus an optional explicit page tag.
///
/// In YAML a step is either a plain string or `{text: ..., page: ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "StepRepr")]
pub struct Step {
    pub text: String,

    /// Explicit page assignment; skips keyword classification for this step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
}

impl Step {
    pub fn new(text: &str) -> Self {
        Step {
            text: text.to_string(),
            page: None,
        }
    }

    pub fn tagged(text: &str, page: &str) -> Self {
        Step {
            text: text.to_string(),
            page: Some(page.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StepRepr {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        page: Option<String>,
    },
}

impl From<StepRepr> for Step {
    fn from(repr: StepRepr) -> Self {
        match repr {
            StepRepr::Text(text) => Step { text, page: None },
            StepRepr::Full { text, page } => Step { text, page },
        }
    }
}

/// A declared page: keyword set for classification and, optionally, an
/// explicit element list that replaces inference entirely for this page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageDecl {
    pub name: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Explicit elements (override). When present, the assembler uses these
    /// verbatim and never runs extraction for this page.
    #[serde(default)]
    pub elements: Vec<ElementDecl>,
}

/// An explicitly declared element inside a `PageDecl`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDecl {
    pub name: String,

    /// input | button | text | link
    pub role: String,

    /// Selector candidates, most specific first
    pub selectors: Vec<String>,
}

impl InstructionSet {
    /// All steps across all test cases, flattened in document order.
    pub fn all_steps(&self) -> Vec<Step> {
        self.test_cases
            .iter()
            .flat_map(|tc| tc.steps.iter().cloned())
            .collect()
    }
}
