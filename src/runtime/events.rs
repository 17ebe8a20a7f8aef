use std::{fs::OpenOptions, io::Write, sync::Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

// ============================================================================
// Healing event sink
// ============================================================================

/// Outcome of one healing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealingOutcome {
    Healed,
    Failed,
}

/// Structured record of one healing attempt, emitted for external
/// observability. The core never branches on its own emitted events.
#[derive(Debug, Clone, Serialize)]
pub struct HealingEvent {
    pub timestamp_ms: u128,
    pub step_name: Option<String>,
    pub element: String,
    pub exhausted_selectors: Vec<String>,
    pub regenerated_selectors: Vec<String>,
    pub outcome: HealingOutcome,
}

impl HealingEvent {
    pub fn now(
        step_name: Option<&str>,
        element: &str,
        exhausted: &[String],
        regenerated: &[String],
        outcome: HealingOutcome,
    ) -> Self {
        HealingEvent {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
            step_name: step_name.map(|s| s.to_string()),
            element: element.to_string(),
            exhausted_selectors: exhausted.to_vec(),
            regenerated_selectors: regenerated.to_vec(),
            outcome,
        }
    }
}

/// Consumes healing events. The JSONL logger is the default sink; tests use
/// an in-memory one.
pub trait HealingSink: Send + Sync {
    fn emit(&self, event: &HealingEvent);
}

/// Sink that drops everything.
pub struct NullSink;

impl HealingSink for NullSink {
    fn emit(&self, _event: &HealingEvent) {}
}

/// Appends one JSON line per event. Failures degrade to stderr warnings,
/// never to errors — observability must not break a scenario.
pub struct HealingLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl HealingLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                eprintln!("Warning: could not open healing log '{}': {}", path, e);
                Self { file: None }
            }
        }
    }
}

impl HealingSink for HealingLogger {
    fn emit(&self, event: &HealingEvent) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return, // logging disabled
        };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Warning: failed to serialize healing event: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: healing log lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            eprintln!("Warning: failed to write healing event: {}", e);
        }
    }
}
