mod common;

use common::builders::{
    element_decl, explicit_page_decl, login_instruction_set, login_snapshot,
};
use common::mock_driver::MockDriver;

use page_forge::assemble::page_object::{Provenance, Role};
use page_forge::cache::dom_cache::DomCache;
use page_forge::extract::dom_analysis::HeuristicAnalyzer;
use page_forge::generate::scenario::MockScenarioGenerator;
use page_forge::{fetch_snapshot, run_generation};

fn temp_cache_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "page-forge-pipeline-test-{}-{}",
        tag,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

// ============================================================================
// End-to-end generation over the login fixture
// ============================================================================

#[test]
fn login_fixture_produces_expected_pages_and_elements() {
    let set = login_instruction_set();
    let output = run_generation(
        &set,
        &login_snapshot(),
        &HeuristicAnalyzer,
        &MockScenarioGenerator,
    )
    .unwrap();

    let login = output.registry.get("login").unwrap();
    assert_eq!(
        login.element_names(),
        vec!["username", "password", "submit"],
        "Login page carries its three logical elements in step order"
    );

    let dashboard = output.registry.get("dashboard").unwrap();
    assert_eq!(dashboard.element_names(), vec!["message"]);

    assert!(
        !output.registry.contains("generic"),
        "Every step matched a declared page, so no fallback page exists"
    );

    // Inferred elements picked up real selectors from the snapshot
    let username = login.element("username").unwrap();
    assert_eq!(username.role, Role::Input);
    assert_eq!(username.provenance, Provenance::Inferred);
    assert!(username.selectors.contains(&"#username".to_string()));

    let message = dashboard.element("message").unwrap();
    assert_eq!(message.role, Role::Text);
    assert!(message.selectors.contains(&"#success-banner".to_string()));
}

#[test]
fn login_fixture_artifacts_cover_all_three_kinds() {
    let set = login_instruction_set();
    let output = run_generation(
        &set,
        &login_snapshot(),
        &HeuristicAnalyzer,
        &MockScenarioGenerator,
    )
    .unwrap();

    assert!(output.artifacts.feature.contains("Feature: Example App"));
    assert!(
        output.artifacts.feature.contains("Scenario: Successful login"),
        "Scenario text from the generator lands in the feature file"
    );

    assert!(
        output
            .artifacts
            .step_definitions
            .contains("enter username {string}"),
        "Quoted step values are parameterized in the bindings"
    );

    let page_names: Vec<&str> = output
        .artifacts
        .page_objects
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(page_names, vec!["login", "dashboard"]);

    let (_, login_src) = &output.artifacts.page_objects[0];
    assert!(login_src.contains("class LoginPage"));
    assert!(login_src.contains("#username"));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn two_runs_over_the_same_inputs_are_byte_identical() {
    let set = login_instruction_set();
    let snapshot = login_snapshot();

    let a = run_generation(&set, &snapshot, &HeuristicAnalyzer, &MockScenarioGenerator).unwrap();
    let b = run_generation(&set, &snapshot, &HeuristicAnalyzer, &MockScenarioGenerator).unwrap();

    assert_eq!(a.registry, b.registry);
    assert_eq!(a.artifacts.feature, b.artifacts.feature);
    assert_eq!(a.artifacts.step_definitions, b.artifacts.step_definitions);
    assert_eq!(a.artifacts.page_objects, b.artifacts.page_objects);
}

// ============================================================================
// Explicit declarations vs inference
// ============================================================================

#[test]
fn explicit_page_declaration_bypasses_inference() {
    let mut set = login_instruction_set();
    set.pages[0] = explicit_page_decl(
        "login",
        vec![
            element_decl("username", "input", &["#user-field"]),
            element_decl("submit", "button", &["button.login"]),
        ],
    );

    let output = run_generation(
        &set,
        &login_snapshot(),
        &HeuristicAnalyzer,
        &MockScenarioGenerator,
    )
    .unwrap();

    let login = output.registry.get("login").unwrap();
    assert_eq!(
        login.element_names(),
        vec!["username", "submit"],
        "Declared elements, nothing inferred on top"
    );

    let username = login.element("username").unwrap();
    assert_eq!(username.provenance, Provenance::Explicit);
    assert_eq!(username.selectors, vec!["#user-field".to_string()]);
}

#[test]
fn repeated_steps_do_not_duplicate_logical_names() {
    let mut set = login_instruction_set();
    set.test_cases[0].steps.insert(
        1,
        page_forge::instruction::instruction_model::Step::new("enter username 'jane'"),
    );

    let output = run_generation(
        &set,
        &login_snapshot(),
        &HeuristicAnalyzer,
        &MockScenarioGenerator,
    )
    .unwrap();

    let login = output.registry.get("login").unwrap();
    let names = login.element_names();
    let mut deduped = names.clone();
    deduped.dedup();
    assert_eq!(names, deduped, "Each logical name appears exactly once");
    assert_eq!(
        names.iter().filter(|n| **n == "username").count(),
        1,
        "Second username step merged into the existing element"
    );
}

// ============================================================================
// Snapshot fetch + cache interplay
// ============================================================================

#[test]
fn fetch_snapshot_serves_second_call_from_cache() {
    let dir = temp_cache_dir("fetch");
    let cache = DomCache::new(&dir, 60_000);
    let mut driver = MockDriver::new(&[], login_snapshot());

    let first = fetch_snapshot(&mut driver, &cache, "https://example.com/login").unwrap();
    assert_eq!(*driver.snapshot_calls.borrow(), 1);
    assert_eq!(first.title, "Login - Example App");

    let second = fetch_snapshot(&mut driver, &cache, "https://example.com/login").unwrap();
    assert_eq!(
        *driver.snapshot_calls.borrow(),
        1,
        "Second fetch inside the TTL never touches the driver"
    );
    assert_eq!(second.title, first.title);

    let _ = std::fs::remove_dir_all(&dir);
}
