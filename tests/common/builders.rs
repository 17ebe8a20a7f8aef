use page_forge::extract::dom_analysis::{DomElement, DomSnapshot};
use page_forge::instruction::instruction_model::{
    ElementDecl, InstructionSet, PageDecl, Step, TestCase,
};

// ============================================================================
// DOM snapshot builders
// ============================================================================

pub fn input_element(id: &str, name: &str, input_type: &str) -> DomElement {
    DomElement {
        tag: "input".into(),
        id: Some(id.into()),
        name: Some(name.into()),
        r#type: Some(input_type.into()),
        placeholder: None,
        text: None,
        aria_label: None,
        href: None,
        disabled: false,
    }
}

pub fn button_element(id: &str, label: &str) -> DomElement {
    DomElement {
        tag: "button".into(),
        id: Some(id.into()),
        name: None,
        r#type: Some("submit".into()),
        placeholder: None,
        text: Some(label.into()),
        aria_label: Some(label.into()),
        href: None,
        disabled: false,
    }
}

pub fn text_element(id: &str, text: &str) -> DomElement {
    DomElement {
        tag: "div".into(),
        id: Some(id.into()),
        name: None,
        r#type: None,
        placeholder: None,
        text: Some(text.into()),
        aria_label: None,
        href: None,
        disabled: false,
    }
}

/// A login + success-banner page, matching the canonical end-to-end fixture.
pub fn login_snapshot() -> DomSnapshot {
    DomSnapshot {
        url: Some("https://example.com/login".into()),
        title: "Login - Example App".into(),
        elements: vec![
            input_element("username", "username", "text"),
            input_element("password", "password", "password"),
            button_element("login-btn", "Login"),
            text_element("success-banner", "success message goes here"),
        ],
    }
}

// ============================================================================
// Instruction set builders
// ============================================================================

pub fn login_instruction_set() -> InstructionSet {
    InstructionSet {
        project: "Example App".into(),
        url: "https://example.com/login".into(),
        test_cases: vec![TestCase {
            name: "Successful login".into(),
            steps: vec![
                Step::new("enter username 'john'"),
                Step::new("enter password 'x'"),
                Step::new("click login button"),
                Step::new("see success message"),
            ],
        }],
        pages: vec![
            page_decl("login", &["username", "password", "login"]),
            page_decl("dashboard", &["success"]),
        ],
    }
}

pub fn page_decl(name: &str, keywords: &[&str]) -> PageDecl {
    PageDecl {
        name: name.into(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        elements: Vec::new(),
    }
}

pub fn explicit_page_decl(name: &str, elements: Vec<ElementDecl>) -> PageDecl {
    PageDecl {
        name: name.into(),
        keywords: Vec::new(),
        elements,
    }
}

pub fn element_decl(name: &str, role: &str, selectors: &[&str]) -> ElementDecl {
    ElementDecl {
        name: name.into(),
        role: role.into(),
        selectors: selectors.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn steps(texts: &[&str]) -> Vec<Step> {
    texts.iter().map(|t| Step::new(t)).collect()
}
