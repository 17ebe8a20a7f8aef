use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::extract::dom_analysis::DomSnapshot;
use crate::instruction::instruction_model::TestCase;

// ============================================================================
// ScenarioGenerator — the language-model collaborator
// ============================================================================

/// Turns one test case plus a DOM snapshot into scenario text. The output
/// is opaque to the core: it lands verbatim in the feature artifact.
pub trait ScenarioGenerator {
    fn generate(&self, test_case: &TestCase, snapshot: &DomSnapshot) -> Result<String, CoreError>;
}

// ============================================================================
// Mock backend — deterministic Gherkin from the raw steps
// ============================================================================

/// Offline generator used in tests and `--generator mock` runs. Produces
/// the same bytes for the same test case, which is what the idempotence
/// contract needs.
pub struct MockScenarioGenerator;

impl ScenarioGenerator for MockScenarioGenerator {
    fn generate(&self, test_case: &TestCase, _snapshot: &DomSnapshot) -> Result<String, CoreError> {
        let mut out = format!("Scenario: {}\n", test_case.name);
        for (i, step) in test_case.steps.iter().enumerate() {
            let keyword = if i == 0 {
                "Given"
            } else if i == test_case.steps.len() - 1 {
                "Then"
            } else {
                "When"
            };
            out.push_str(&format!("  {} {}\n", keyword, step.text));
        }
        Ok(out)
    }
}

// ============================================================================
// HTTP backend (Ollama-style JSON endpoint)
// ============================================================================

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// LLM-backed generator. Transport failures are retried a bounded number of
/// times with a fixed delay; exhausting retries is a fatal Generation error.
pub struct HttpScenarioGenerator {
    pub endpoint: String,
    pub model: String,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for HttpScenarioGenerator {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "qwen2.5:1.5b".to_string(),
            max_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl HttpScenarioGenerator {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            ..Self::default()
        }
    }

    fn build_prompt(&self, test_case: &TestCase, snapshot: &DomSnapshot) -> String {
        let steps = test_case
            .steps
            .iter()
            .map(|s| format!("  - {}", s.text))
            .collect::<Vec<_>>()
            .join("\n");

        let elements = snapshot
            .elements
            .iter()
            .filter_map(|el| {
                el.aria_label
                    .as_deref()
                    .or(el.name.as_deref())
                    .or(el.id.as_deref())
            })
            .take(20)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"You write Gherkin scenarios for UI tests.

PAGE: {} ({})
VISIBLE ELEMENTS: {}

USER INSTRUCTIONS for scenario "{}":
{}

Write one Gherkin Scenario block (Scenario:, Given/When/Then lines) covering
exactly these instructions. Respond with ONLY the scenario text."#,
            snapshot.title,
            snapshot.url.as_deref().unwrap_or("unknown"),
            if elements.is_empty() { "(none)" } else { &elements },
            test_case.name,
            steps
        )
    }

    fn request_once(&self, prompt: &str) -> Result<String, CoreError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| CoreError::Transport {
                target: self.endpoint.clone(),
                detail: e.to_string(),
            })?;

        let parsed: GenerateResponse = response.json().map_err(|e| CoreError::Transport {
            target: self.endpoint.clone(),
            detail: format!("bad response body: {}", e),
        })?;

        Ok(parsed.response)
    }
}

impl ScenarioGenerator for HttpScenarioGenerator {
    fn generate(&self, test_case: &TestCase, snapshot: &DomSnapshot) -> Result<String, CoreError> {
        let prompt = self.build_prompt(test_case, snapshot);
        generate_with_retry(
            || self.request_once(&prompt),
            self.max_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

/// Bounded retry with a fixed delay between attempts. Only transport errors
/// are retried; anything else surfaces immediately. Exhaustion escalates to
/// a Generation error carrying the last transport failure.
pub fn generate_with_retry<F>(
    mut attempt: F,
    max_attempts: u32,
    delay: Duration,
) -> Result<String, CoreError>
where
    F: FnMut() -> Result<String, CoreError>,
{
    let mut last_detail = String::new();

    for n in 0..max_attempts.max(1) {
        match attempt() {
            Ok(text) => return Ok(text),
            Err(CoreError::Transport { target, detail }) => {
                last_detail = format!("{} ({})", detail, target);
                if n + 1 < max_attempts {
                    thread::sleep(delay);
                }
            }
            Err(other) => return Err(other),
        }
    }

    Err(CoreError::Generation {
        detail: format!(
            "transport failed after {} attempts: {}",
            max_attempts.max(1),
            last_detail
        ),
    })
}
