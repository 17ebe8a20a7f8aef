use crate::assemble::page_object::{ElementSpec, Provenance, Role};
use crate::classify::page_info::{FALLBACK_PAGE, PageInfo, PageRule};
use crate::instruction::instruction_model::{PageDecl, Step};

// ============================================================================
// PageClassifier — assigns steps to pages via an ordered rule table
// ============================================================================

/// Classify steps into pages.
///
/// Priority 1: a page declared with explicit `elements` is used verbatim;
/// keyword auto-detection never runs for it (only explicit step tags can
/// assign steps to it).
///
/// Priority 2: each remaining step is matched against every non-explicit
/// page's keywords in declaration order. A step joins *every* matching page
/// (cross-page membership); a step matching none falls back to the implicit
/// "generic" page.
///
/// Deterministic: identical steps + identical declarations always yield the
/// same `Vec<PageInfo>`, in declaration order with "generic" last.
pub fn classify_steps(steps: &[Step], declarations: &[PageDecl]) -> Vec<PageInfo> {
    let mut pages: Vec<PageInfo> = declarations.iter().map(to_page_info).collect();
    let rules: Vec<PageRule> = declarations
        .iter()
        .filter(|d| d.elements.is_empty())
        .map(|d| PageRule {
            name: d.name.clone(),
            keywords: d.keywords.clone(),
        })
        .collect();

    let mut fallback_indices: Vec<usize> = Vec::new();

    for (i, step) in steps.iter().enumerate() {
        // Explicit tag beats keyword detection for this step
        if let Some(tag) = &step.page {
            assign(&mut pages, tag, i);
            continue;
        }

        let mut matched = false;
        for rule in &rules {
            if rule.matches(&step.text) {
                assign(&mut pages, &rule.name, i);
                matched = true;
            }
        }

        if !matched {
            fallback_indices.push(i);
        }
    }

    if !fallback_indices.is_empty() {
        pages.push(PageInfo {
            name: FALLBACK_PAGE.to_string(),
            keywords: Vec::new(),
            step_indices: fallback_indices,
            explicit_elements: None,
        });
    }

    // Pages that attracted no steps and carry no explicit elements would
    // assemble to empty page objects; drop them.
    pages.retain(|p| !p.step_indices.is_empty() || p.is_explicit());
    pages
}

/// Add `step_index` to the named page, creating an implicit page for an
/// explicit tag that names no declared page.
fn assign(pages: &mut Vec<PageInfo>, name: &str, step_index: usize) {
    if let Some(page) = pages.iter_mut().find(|p| p.name == name) {
        if !page.step_indices.contains(&step_index) {
            page.step_indices.push(step_index);
        }
    } else {
        pages.push(PageInfo {
            name: name.to_string(),
            keywords: Vec::new(),
            step_indices: vec![step_index],
            explicit_elements: None,
        });
    }
}

fn to_page_info(decl: &PageDecl) -> PageInfo {
    let explicit_elements = if decl.elements.is_empty() {
        None
    } else {
        Some(
            decl.elements
                .iter()
                .map(|el| ElementSpec {
                    name: el.name.clone(),
                    role: Role::parse(&el.role).unwrap_or(Role::Text),
                    selectors: el.selectors.clone(),
                    provenance: Provenance::Explicit,
                })
                .collect(),
        )
    };

    PageInfo {
        name: decl.name.clone(),
        keywords: decl.keywords.clone(),
        step_indices: Vec::new(),
        explicit_elements,
    }
}
