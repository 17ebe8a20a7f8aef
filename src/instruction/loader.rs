use std::path::Path;

use crate::error::CoreError;
use crate::instruction::instruction_model::InstructionSet;

// ============================================================================
// InstructionSet loading
// ============================================================================

/// Load an InstructionSet from a YAML or JSON file (by extension).
pub fn load_instruction_set(path: &str) -> Result<InstructionSet, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::Io {
        context: format!("reading instruction set '{}'", path),
        source: e,
    })?;

    let set = match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("json") => {
            serde_json::from_str(&content).map_err(|e| CoreError::JsonParse {
                context: format!("instruction set '{}'", path),
                source: e,
            })?
        }
        _ => serde_yaml::from_str(&content).map_err(|e| CoreError::YamlParse {
            context: format!("instruction set '{}'", path),
            source: e,
        })?,
    };

    validate(&set)?;
    Ok(set)
}

/// Structural validation beyond what serde enforces.
pub fn validate(set: &InstructionSet) -> Result<(), CoreError> {
    if set.project.trim().is_empty() {
        return Err(CoreError::InvalidInstruction {
            field: "project".into(),
            detail: "project name must not be empty".into(),
        });
    }
    if set.url.trim().is_empty() {
        return Err(CoreError::InvalidInstruction {
            field: "url".into(),
            detail: "url must not be empty".into(),
        });
    }
    if set.test_cases.is_empty() && set.pages.is_empty() {
        return Err(CoreError::InvalidInstruction {
            field: "test_cases".into(),
            detail: "at least one test case or explicit page is required".into(),
        });
    }

    for tc in &set.test_cases {
        if tc.steps.is_empty() {
            return Err(CoreError::InvalidInstruction {
                field: format!("test_cases['{}'].steps", tc.name),
                detail: "test case has no steps".into(),
            });
        }
    }

    let mut seen_pages = Vec::new();
    for page in &set.pages {
        if seen_pages.contains(&page.name) {
            return Err(CoreError::InvalidInstruction {
                field: format!("pages['{}']", page.name),
                detail: "duplicate page declaration".into(),
            });
        }
        seen_pages.push(page.name.clone());

        let mut seen_elements: Vec<&str> = Vec::new();
        for el in &page.elements {
            if seen_elements.contains(&el.name.as_str()) {
                return Err(CoreError::InvalidInstruction {
                    field: format!("pages['{}'].elements['{}']", page.name, el.name),
                    detail: "duplicate logical element name".into(),
                });
            }
            seen_elements.push(&el.name);

            if !matches!(el.role.as_str(), "input" | "button" | "text" | "link") {
                return Err(CoreError::InvalidInstruction {
                    field: format!("pages['{}'].elements['{}'].role", page.name, el.name),
                    detail: format!(
                        "unknown role '{}' (expected input, button, text or link)",
                        el.role
                    ),
                });
            }
        }
    }

    Ok(())
}
