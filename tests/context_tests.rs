use page_forge::assemble::page_object::{ElementSpec, PageObject, PageRegistry, Role};
use page_forge::error::CoreError;
use page_forge::runtime::context::PageContextManager;

// ============================================================================
// Helpers
// ============================================================================

fn registry_with(names: &[&str]) -> PageRegistry {
    let mut registry = PageRegistry::new();
    for name in names {
        let element = ElementSpec::new("thing", Role::Text);
        registry.insert(PageObject::new(name, vec![element]));
    }
    registry
}

// ============================================================================
// State transitions
// ============================================================================

#[test]
fn get_current_page_before_any_set_fails_with_no_active_page() {
    let ctx = PageContextManager::new(registry_with(&["login"]));

    let err = ctx.get_current_page().unwrap_err();
    assert!(
        matches!(err, CoreError::NoActivePage { .. }),
        "Expected NoActivePage, got: {}",
        err
    );
}

#[test]
fn set_current_page_to_unknown_name_fails_and_keeps_cursor() {
    let mut ctx = PageContextManager::new(registry_with(&["login"]));

    let err = ctx.set_current_page("checkout").unwrap_err();
    assert!(matches!(err, CoreError::UnknownPage { .. }));
    assert_eq!(ctx.current_page_name(), None, "Failed transition must not move the cursor");
}

#[test]
fn set_then_get_returns_the_named_page() {
    let mut ctx = PageContextManager::new(registry_with(&["login", "dashboard"]));

    ctx.set_current_page("login").unwrap();
    assert_eq!(ctx.get_current_page().unwrap().name, "login");

    ctx.set_current_page("dashboard").unwrap();
    assert_eq!(ctx.get_current_page().unwrap().name, "dashboard");
}

#[test]
fn get_page_is_independent_of_the_cursor() {
    let ctx = PageContextManager::new(registry_with(&["login", "dashboard"]));

    // No cursor set, direct lookup still works
    assert_eq!(ctx.get_page("dashboard").unwrap().name, "dashboard");

    let err = ctx.get_page("missing").unwrap_err();
    assert!(matches!(err, CoreError::UnknownPage { .. }));
}

#[test]
fn each_context_owns_an_independent_registry_copy() {
    let registry = registry_with(&["login"]);

    let mut first = PageContextManager::new(registry.clone());
    let second = PageContextManager::new(registry);

    first.set_current_page("login").unwrap();
    assert_eq!(first.current_page_name(), Some("login"));
    assert_eq!(
        second.current_page_name(),
        None,
        "Scenario contexts must not share cursor state"
    );
}
