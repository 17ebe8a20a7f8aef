use crate::assemble::page_object::{ElementSpec, PageObject, PageRegistry};
use crate::classify::page_info::PageInfo;
use crate::extract::dom_analysis::ElementCandidate;
use crate::extract::extractor::{extract_stubs, resolve_selectors};
use crate::instruction::instruction_model::Step;

// ============================================================================
// PageObjectAssembler — stubs per page → immutable PageObjects
// ============================================================================

/// Assemble one PageObject per classified page.
///
/// Explicit pages pass their declared elements through unmodified; inference
/// never runs for them. Otherwise stubs from every assigned step are unioned
/// by logical name: the first occurrence establishes the ElementSpec, later
/// stubs with the same name append their selector candidates. This merge is
/// what guarantees no PageObject carries duplicate logical names.
pub fn assemble_pages(
    pages: &[PageInfo],
    steps: &[Step],
    candidates: &[ElementCandidate],
) -> PageRegistry {
    let mut registry = PageRegistry::new();

    for info in pages {
        registry.insert(assemble_page(info, steps, candidates));
    }

    registry
}

/// Assemble a single page.
pub fn assemble_page(
    info: &PageInfo,
    steps: &[Step],
    candidates: &[ElementCandidate],
) -> PageObject {
    if let Some(explicit) = &info.explicit_elements {
        return PageObject::new(&info.name, explicit.clone());
    }

    let mut elements: Vec<ElementSpec> = Vec::new();

    for &idx in &info.step_indices {
        let Some(step) = steps.get(idx) else { continue };

        for mut stub in extract_stubs(&step.text) {
            resolve_selectors(&mut stub, candidates);

            match elements.iter_mut().find(|e| e.name == stub.name) {
                // Later stub with the same name: append candidates only
                Some(existing) => existing.merge_selectors(&stub.selectors),
                None => elements.push(stub),
            }
        }
    }

    PageObject::new(&info.name, elements)
}
