use page_forge::assemble::assembler::{assemble_page, assemble_pages};
use page_forge::assemble::page_object::{Provenance, Role};
use page_forge::classify::classifier::classify_steps;
use page_forge::extract::dom_analysis::{DomAnalysis, HeuristicAnalyzer};

mod common;
use crate::common::builders::{
    element_decl, explicit_page_decl, login_snapshot, page_decl, steps,
};

// ============================================================================
// Merge semantics
// ============================================================================

#[test]
fn duplicate_logical_names_merge_instead_of_duplicating() {
    let decls = vec![page_decl("login", &["username", "login"])];
    let steps = steps(&[
        "enter username 'john'",
        "enter username 'jane' on the login form again",
    ]);
    let candidates = HeuristicAnalyzer.analyze(&login_snapshot());

    let pages = classify_steps(&steps, &decls);
    let page = assemble_page(&pages[0], &steps, &candidates);

    assert_eq!(
        page.element_names(),
        vec!["username"],
        "Second occurrence must merge, not duplicate"
    );
}

#[test]
fn later_stub_appends_new_candidates_to_existing_spec() {
    let decls = vec![page_decl("login", &["username"])];
    let steps = steps(&["enter username 'a'", "enter username 'b'"]);
    let candidates = HeuristicAnalyzer.analyze(&login_snapshot());

    let pages = classify_steps(&steps, &decls);
    let page = assemble_page(&pages[0], &steps, &candidates);
    let spec = page.element("username").unwrap();

    // Same DOM, so the second stub contributes nothing new — but order and
    // uniqueness of the original list must hold
    assert_eq!(spec.selectors[0], "#username");
    let mut deduped = spec.selectors.clone();
    deduped.dedup();
    assert_eq!(deduped, spec.selectors, "No repeated candidates");
}

#[test]
fn first_occurrence_establishes_element_order() {
    let decls = vec![page_decl("login", &["username", "password", "login"])];
    let steps = steps(&[
        "enter username 'john'",
        "enter password 'x'",
        "click login button",
    ]);
    let candidates = HeuristicAnalyzer.analyze(&login_snapshot());

    let pages = classify_steps(&steps, &decls);
    let page = assemble_page(&pages[0], &steps, &candidates);

    assert_eq!(page.element_names(), vec!["username", "password", "submit"]);
}

// ============================================================================
// Explicit override priority
// ============================================================================

#[test]
fn explicit_elements_pass_through_unmodified() {
    let decls = vec![explicit_page_decl(
        "login",
        vec![
            element_decl("user", "input", &["#user", "input[name=\"user\"]"]),
            element_decl("go", "button", &["#go"]),
        ],
    )];
    let steps = steps(&["enter user 'x' and click go"]);
    let candidates = HeuristicAnalyzer.analyze(&login_snapshot());

    let pages = classify_steps(&steps, &decls);
    let registry = assemble_pages(&pages, &steps, &candidates);
    let page = registry.get("login").unwrap();

    assert_eq!(page.element_names(), vec!["user", "go"]);
    let user = page.element("user").unwrap();
    assert_eq!(user.selectors, vec!["#user", "input[name=\"user\"]"]);
    assert_eq!(user.role, Role::Input);
    assert_eq!(
        user.provenance,
        Provenance::Explicit,
        "Inference must never run for an explicit page"
    );
}

// ============================================================================
// Completeness and cross-page propagation
// ============================================================================

#[test]
fn every_referenced_element_lands_on_its_page() {
    let decls = vec![
        page_decl("login", &["username", "password", "login"]),
        page_decl("dashboard", &["success"]),
    ];
    let steps = steps(&[
        "enter username 'john'",
        "enter password 'x'",
        "click login button",
        "see success message",
    ]);
    let candidates = HeuristicAnalyzer.analyze(&login_snapshot());

    let pages = classify_steps(&steps, &decls);
    let registry = assemble_pages(&pages, &steps, &candidates);

    assert_eq!(
        registry.get("login").unwrap().element_names(),
        vec!["username", "password", "submit"]
    );
    assert_eq!(
        registry.get("dashboard").unwrap().element_names(),
        vec!["message"]
    );
}

#[test]
fn cross_page_element_appears_independently_on_both_pages() {
    let decls = vec![
        page_decl("login", &["login"]),
        page_decl("dashboard", &["banner"]),
    ];
    // One step matching both pages
    let steps = steps(&["see login banner"]);
    let candidates = HeuristicAnalyzer.analyze(&login_snapshot());

    let pages = classify_steps(&steps, &decls);
    let registry = assemble_pages(&pages, &steps, &candidates);

    let login = registry.get("login").unwrap();
    let dashboard = registry.get("dashboard").unwrap();

    assert_eq!(login.element_names(), vec!["banner"]);
    assert_eq!(dashboard.element_names(), vec!["banner"]);
    assert_eq!(
        login.element("banner"),
        dashboard.element("banner"),
        "Same spec content, held independently per page"
    );
}
