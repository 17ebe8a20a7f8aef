use crate::assemble::page_object::{PageObject, PageRegistry, Role};
use crate::extract::extractor::extract_stubs;
use crate::instruction::instruction_model::InstructionSet;

// ============================================================================
// ArtifactEmitter — PageObjects + scenario texts → source blobs
// ============================================================================

/// The complete artifact set for one generation run. Rendered fully in
/// memory so a failing run never leaves a partial set on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSet {
    /// One feature file for the whole instruction set
    pub feature: String,

    /// One step-definition source blob
    pub step_definitions: String,

    /// (page name, page-object source) per detected page, registry order
    pub page_objects: Vec<(String, String)>,
}

/// Render every artifact. Byte-for-byte reproducible from an identical
/// InstructionSet + registry + scenario texts: all iteration follows stored
/// order and nothing here consults a clock or RNG.
pub fn emit_artifacts(
    set: &InstructionSet,
    registry: &PageRegistry,
    scenario_texts: &[String],
) -> ArtifactSet {
    ArtifactSet {
        feature: emit_feature(set, scenario_texts),
        step_definitions: emit_step_definitions(set),
        page_objects: registry
            .pages()
            .iter()
            .map(|p| (p.name.clone(), emit_page_object(p)))
            .collect(),
    }
}

// ============================================================================
// Feature file
// ============================================================================

/// Feature blob: header plus one scenario block per test case. Scenario
/// bodies come from the generation collaborator and are treated as opaque
/// text; when a body is missing (offline generation) the raw steps are
/// rendered instead.
pub fn emit_feature(set: &InstructionSet, scenario_texts: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Feature: {}\n", set.project));
    out.push_str(&format!("  # Base URL: {}\n", set.url));

    for (i, tc) in set.test_cases.iter().enumerate() {
        out.push('\n');
        match scenario_texts.get(i).filter(|t| !t.trim().is_empty()) {
            Some(text) => {
                for line in text.trim_end().lines() {
                    out.push_str("  ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            None => {
                out.push_str(&format!("  Scenario: {}\n", tc.name));
                for (j, step) in tc.steps.iter().enumerate() {
                    let keyword = if j == 0 { "Given" } else { "When" };
                    out.push_str(&format!("    {} {}\n", keyword, step.text));
                }
            }
        }
    }

    out
}

// ============================================================================
// Step definitions
// ============================================================================

/// Cucumber-style step definition source. One binding per unique step text,
/// in first-occurrence order, dispatching to the safe operations matching
/// the step's extracted role.
pub fn emit_step_definitions(set: &InstructionSet) -> String {
    let mut out = String::new();
    out.push_str("const { Given, When, Then } = require('@cucumber/cucumber');\n");
    out.push_str("const { pageContext, resolver } = require('../support/runtime');\n\n");

    let mut seen: Vec<String> = Vec::new();
    for tc in &set.test_cases {
        for step in &tc.steps {
            let pattern = parameterize(&step.text);
            if seen.contains(&pattern) {
                continue;
            }
            seen.push(pattern.clone());
            out.push_str(&step_binding(&step.text, &pattern));
        }
    }

    out
}

fn step_binding(step_text: &str, pattern: &str) -> String {
    let stubs = extract_stubs(step_text);
    let Some(stub) = stubs.first() else {
        return format!(
            "When('{}', async () => {{\n  // no element reference in this step\n}});\n\n",
            escape_js(pattern)
        );
    };

    let takes_value = pattern.contains("{string}");
    let (keyword, body) = match stub.role {
        Role::Input => (
            "When",
            if takes_value {
                format!(
                    "  await resolver.safeSetValue(pageContext, '{}', value);",
                    escape_js(&stub.name)
                )
            } else {
                format!(
                    "  await resolver.safeSetValue(pageContext, '{}', '');",
                    escape_js(&stub.name)
                )
            },
        ),
        Role::Button | Role::Link => (
            "When",
            format!(
                "  await resolver.safeClick(pageContext, '{}');",
                escape_js(&stub.name)
            ),
        ),
        Role::Text => (
            "Then",
            format!(
                "  if (!(await resolver.safeIsDisplayed(pageContext, '{}'))) {{\n    throw new Error(\"expected '{}' to be displayed\");\n  }}",
                escape_js(&stub.name),
                escape_js(&stub.name)
            ),
        ),
    };

    let args = if takes_value { "value" } else { "" };
    format!(
        "{}('{}', async ({}) => {{\n{}\n}});\n\n",
        keyword,
        escape_js(pattern),
        args,
        body
    )
}

/// Replace quoted literals with a `{string}` parameter. A quote with no
/// closing partner stays a literal character, so apostrophes in prose do
/// not truncate the pattern.
fn parameterize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            if let Some(close) = chars[i + 1..].iter().position(|&x| x == c) {
                out.push_str("{string}");
                i += close + 2;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out.trim().to_string()
}

// ============================================================================
// Page objects
// ============================================================================

/// Page-object source: one class per page, one accessor per logical element
/// carrying the full ordered candidate list.
pub fn emit_page_object(page: &PageObject) -> String {
    let class_name = class_case(&page.name);
    let mut out = String::new();

    out.push_str(&format!("class {}Page {{\n", class_name));

    for el in page.elements() {
        let selectors = el
            .selectors
            .iter()
            .map(|s| format!("'{}'", escape_js(s)))
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!(
            "  // role: {}\n  get {}() {{\n    return [{}];\n  }}\n\n",
            el.role.as_str(),
            accessor_name(&el.name),
            selectors
        ));
    }

    out.push_str("}\n\n");
    out.push_str(&format!("module.exports = new {}Page();\n", class_name));
    out
}

/// "login" → "Login", "user-profile" → "UserProfile".
fn class_case(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Valid JS identifier for a logical name.
fn accessor_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(true) {
        format!("el_{}", cleaned)
    } else {
        cleaned
    }
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Sanitize an artifact name into a safe filename.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}
