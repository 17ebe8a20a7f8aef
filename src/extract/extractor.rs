use crate::assemble::page_object::{ElementSpec, Role};
use crate::extract::dom_analysis::{DomAnalysis, DomSnapshot, ElementCandidate, candidates_for_role};

// ============================================================================
// ElementExtractor — step text → element stubs
// ============================================================================

const INPUT_VERBS: &[&str] = &["enter", "fill", "type", "set", "provide"];
const CLICK_VERBS: &[&str] = &["click", "press", "tap", "submit", "select"];
const ASSERT_VERBS: &[&str] = &["see", "verify", "check", "expect", "assert"];

/// Labels that normalize to the canonical `submit` button name.
const SUBMIT_KEYWORDS: &[&str] = &["submit", "save", "sign", "login", "continue", "next"];

/// Filler words skipped when deriving a logical name from step text.
const FILLERS: &[&str] = &[
    "the", "a", "an", "in", "into", "on", "to", "that", "should", "is", "was",
    "with", "for", "my", "your", "valid",
];

/// Trailing words that describe the widget, not the element identity.
const WIDGET_WORDS: &[&str] = &["field", "input", "box", "button", "link", "text"];

/// Derive element stubs from one step's text: logical name plus role guess,
/// selectors left empty for `resolve_selectors`.
///
/// Pure and deterministic — same text always yields the same stubs. Steps
/// that reference no element (navigation, waits) yield none.
pub fn extract_stubs(step_text: &str) -> Vec<ElementSpec> {
    let cleaned = strip_quoted(step_text);
    let words: Vec<String> = cleaned
        .split_whitespace()
        .map(|w| normalize_word(w))
        .filter(|w| !w.is_empty())
        .collect();

    let Some((verb_idx, role)) = find_verb(&words) else {
        return Vec::new();
    };

    let name = match role {
        Role::Input => name_after_verb(&words, verb_idx),
        Role::Button => button_name(&words, verb_idx),
        Role::Link => name_before_widget(&words, "link").or_else(|| name_after_verb(&words, verb_idx)),
        Role::Text => assertion_name(&words, verb_idx),
    };

    match name {
        Some(name) => vec![ElementSpec::new(&name, role)],
        None => Vec::new(),
    }
}

/// Fill a stub's selector candidates from DOM analysis, scoped to the stub's
/// role. Candidates whose accessible name overlaps the logical name
/// contribute their selectors in snapshot order; when the DOM offers no
/// match, deterministic attribute guesses derived from the logical name are
/// used instead.
pub fn resolve_selectors(stub: &mut ElementSpec, candidates: &[ElementCandidate]) {
    let matched = matching_selectors(&stub.name, stub.role, candidates);
    if matched.is_empty() {
        stub.merge_selectors(&fallback_selectors(&stub.name, stub.role));
    } else {
        stub.merge_selectors(&matched);
    }
}

/// Regenerate a candidate list for healing: analyze a fresh snapshot, scope
/// to the expected role, match the logical name. Same fallback as initial
/// extraction so the healing pass always has something to try.
pub fn regenerate_candidates(
    logical_name: &str,
    role: Role,
    snapshot: &DomSnapshot,
    analyzer: &dyn DomAnalysis,
) -> Vec<String> {
    let candidates = analyzer.analyze(snapshot);
    let matched = matching_selectors(logical_name, role, &candidates);
    if matched.is_empty() {
        fallback_selectors(logical_name, role)
    } else {
        matched
    }
}

// ============================================================================
// Name matching
// ============================================================================

fn matching_selectors(logical_name: &str, role: Role, candidates: &[ElementCandidate]) -> Vec<String> {
    let needle = logical_name.to_lowercase();
    let mut out: Vec<String> = Vec::new();

    for cand in candidates_for_role(candidates, role) {
        let hay = cand.name.to_lowercase();
        if hay.contains(&needle) || needle.contains(&hay) {
            for s in &cand.selectors {
                if !out.contains(s) {
                    out.push(s.clone());
                }
            }
        }
    }

    out
}

/// Attribute guesses when the snapshot offers no matching element. Mirrors
/// the specificity order of real candidates (id > name > placeholder > tag).
pub fn fallback_selectors(logical_name: &str, role: Role) -> Vec<String> {
    let tag = match role {
        Role::Input => "input",
        Role::Button => "button",
        Role::Link => "a",
        Role::Text => "*",
    };

    vec![
        format!("#{}", logical_name),
        format!("{}[name=\"{}\"]", tag, logical_name),
        format!("{}[placeholder*=\"{}\"]", tag, logical_name),
    ]
}

// ============================================================================
// Step text parsing
// ============================================================================

/// Remove single- or double-quoted literals ("enter username 'john'" keeps
/// only "enter username"). A quote with no closing partner is a plain
/// character (apostrophes in "the user's profile" must not swallow the
/// rest of the step).
fn strip_quoted(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            if let Some(close) = chars[i + 1..].iter().position(|&x| x == c) {
                i += close + 2;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

fn normalize_word(w: &str) -> String {
    w.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect::<String>()
        .to_lowercase()
}

/// First recognized verb and the role it implies. "click ... link" refines
/// Button to Link.
fn find_verb(words: &[String]) -> Option<(usize, Role)> {
    for (i, w) in words.iter().enumerate() {
        if INPUT_VERBS.contains(&w.as_str()) {
            return Some((i, Role::Input));
        }
        if CLICK_VERBS.contains(&w.as_str()) {
            let role = if words.iter().skip(i).any(|w| w == "link") {
                Role::Link
            } else {
                Role::Button
            };
            return Some((i, role));
        }
        if ASSERT_VERBS.contains(&w.as_str()) {
            return Some((i, Role::Text));
        }
    }
    None
}

/// First non-filler, non-widget word after the verb.
fn name_after_verb(words: &[String], verb_idx: usize) -> Option<String> {
    words
        .iter()
        .skip(verb_idx + 1)
        .find(|w| !FILLERS.contains(&w.as_str()) && !WIDGET_WORDS.contains(&w.as_str()))
        .cloned()
}

/// Word immediately before the given widget word ("click login button" →
/// before "button").
fn name_before_widget(words: &[String], widget: &str) -> Option<String> {
    let pos = words.iter().position(|w| w == widget)?;
    words[..pos]
        .iter()
        .rev()
        .find(|w| !FILLERS.contains(&w.as_str()))
        .cloned()
}

/// Buttons carrying a submit-style label normalize to the canonical name
/// "submit" so "click login button" and "press Sign In" land on the same
/// accessor. Otherwise the word before "button", otherwise the first
/// non-filler after the verb.
fn button_name(words: &[String], verb_idx: usize) -> Option<String> {
    let has_submit_keyword = words
        .iter()
        .skip(verb_idx)
        .any(|w| SUBMIT_KEYWORDS.iter().any(|k| w.contains(k)));
    if has_submit_keyword {
        return Some("submit".to_string());
    }

    name_before_widget(words, "button").or_else(|| name_after_verb(words, verb_idx))
}

/// Assertions name the thing observed; take the last meaningful word
/// ("see success message" → "message").
fn assertion_name(words: &[String], verb_idx: usize) -> Option<String> {
    let tail: Vec<&String> = words
        .iter()
        .skip(verb_idx + 1)
        .filter(|w| !FILLERS.contains(&w.as_str()))
        .collect();
    tail.last().map(|w| (*w).clone())
}
