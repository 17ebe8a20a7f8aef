use std::cell::Cell;
use std::time::{Duration, Instant};

use page_forge::error::CoreError;
use page_forge::extract::dom_analysis::DomSnapshot;
use page_forge::generate::scenario::{
    MockScenarioGenerator, ScenarioGenerator, generate_with_retry,
};
use page_forge::instruction::instruction_model::{Step, TestCase};

// ============================================================================
// Mock generator determinism
// ============================================================================

#[test]
fn mock_generator_is_deterministic() {
    let tc = TestCase {
        name: "Login".into(),
        steps: vec![
            Step::new("enter username 'john'"),
            Step::new("click login button"),
        ],
    };

    let first = MockScenarioGenerator.generate(&tc, &DomSnapshot::empty()).unwrap();
    let second = MockScenarioGenerator.generate(&tc, &DomSnapshot::empty()).unwrap();

    assert_eq!(first, second);
    assert!(first.starts_with("Scenario: Login\n"));
    assert!(first.contains("Given enter username 'john'"));
    assert!(first.contains("Then click login button"));
}

// ============================================================================
// Bounded transport retry
// ============================================================================

fn transport_err() -> CoreError {
    CoreError::Transport {
        target: "http://localhost:11434".into(),
        detail: "connection refused".into(),
    }
}

#[test]
fn transport_failures_are_retried_then_escalated() {
    let attempts = Cell::new(0u32);

    let err = generate_with_retry(
        || {
            attempts.set(attempts.get() + 1);
            Err(transport_err())
        },
        3,
        Duration::from_millis(0),
    )
    .unwrap_err();

    assert_eq!(attempts.get(), 3, "Exactly max_attempts tries");
    assert!(
        matches!(err, CoreError::Generation { .. }),
        "Exhausted retries escalate to a fatal generation error"
    );
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn success_after_transient_failure_stops_retrying() {
    let attempts = Cell::new(0u32);

    let text = generate_with_retry(
        || {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 2 {
                Err(transport_err())
            } else {
                Ok("Scenario: ok".to_string())
            }
        },
        5,
        Duration::from_millis(0),
    )
    .unwrap();

    assert_eq!(text, "Scenario: ok");
    assert_eq!(attempts.get(), 2, "No retries after the first success");
}

#[test]
fn non_transport_errors_surface_immediately() {
    let attempts = Cell::new(0u32);

    let err = generate_with_retry(
        || {
            attempts.set(attempts.get() + 1);
            Err(CoreError::Generation {
                detail: "model rejected the prompt".into(),
            })
        },
        3,
        Duration::from_millis(0),
    )
    .unwrap_err();

    assert_eq!(attempts.get(), 1, "Only transport failures are retried");
    assert!(err.to_string().contains("model rejected the prompt"));
}

#[test]
fn retry_delay_is_fixed_between_attempts() {
    let start = Instant::now();

    let _ = generate_with_retry(|| Err(transport_err()), 3, Duration::from_millis(20));

    // Two inter-attempt delays of 20ms each (none after the last attempt)
    assert!(
        start.elapsed() >= Duration::from_millis(40),
        "Fixed delay must separate attempts"
    );
}

#[test]
fn zero_attempts_still_runs_once() {
    let attempts = Cell::new(0u32);

    let _ = generate_with_retry(
        || {
            attempts.set(attempts.get() + 1);
            Err(transport_err())
        },
        0,
        Duration::from_millis(0),
    );

    assert_eq!(attempts.get(), 1);
}
