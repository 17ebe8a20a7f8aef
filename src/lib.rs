use crate::assemble::assembler::assemble_pages;
use crate::assemble::page_object::PageRegistry;
use crate::browser::driver::Driver;
use crate::cache::dom_cache::{DomCache, cache_key};
use crate::classify::classifier::classify_steps;
use crate::emit::emitter::{ArtifactSet, emit_artifacts};
use crate::error::CoreError;
use crate::extract::dom_analysis::{DomAnalysis, DomSnapshot};
use crate::generate::scenario::ScenarioGenerator;
use crate::instruction::instruction_model::InstructionSet;

pub mod assemble;
pub mod browser;
pub mod cache;
pub mod classify;
pub mod cli;
pub mod emit;
pub mod error;
pub mod extract;
pub mod generate;
pub mod instruction;
pub mod runtime;

// ============================================================================
// Generation pipeline: classify → extract → assemble → emit
// ============================================================================

/// Everything one generation run produces.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub registry: PageRegistry,
    pub artifacts: ArtifactSet,
}

/// Run the full single-pass generation pipeline.
///
/// Sequential and deterministic: identical instruction set + snapshot yield
/// byte-identical page objects and artifacts. Any error aborts the whole
/// run — callers must not write a partial artifact set.
pub fn run_generation(
    set: &InstructionSet,
    snapshot: &DomSnapshot,
    analyzer: &dyn DomAnalysis,
    generator: &dyn ScenarioGenerator,
) -> Result<GenerationOutput, CoreError> {
    crate::instruction::loader::validate(set)?;

    let steps = set.all_steps();
    let pages = classify_steps(&steps, &set.pages);
    let candidates = analyzer.analyze(snapshot);
    let registry = assemble_pages(&pages, &steps, &candidates);

    let mut scenario_texts = Vec::with_capacity(set.test_cases.len());
    for tc in &set.test_cases {
        scenario_texts.push(generator.generate(tc, snapshot)?);
    }

    let artifacts = emit_artifacts(set, &registry, &scenario_texts);

    Ok(GenerationOutput {
        registry,
        artifacts,
    })
}

/// Fetch a DOM snapshot for `url`, preferring the TTL cache.
///
/// The healing pass never goes through here — it takes a fresh snapshot
/// straight from the driver.
pub fn fetch_snapshot(
    driver: &mut dyn Driver,
    cache: &DomCache,
    url: &str,
) -> Result<DomSnapshot, CoreError> {
    let key = cache_key(url);

    if let Some(payload) = cache.get(&key) {
        if let Ok(snapshot) = serde_json::from_value::<DomSnapshot>(payload) {
            return Ok(snapshot);
        }
        // Undecodable payload: fall through to a live fetch
    }

    driver.navigate(url)?;
    let snapshot = driver.snapshot()?;

    if let Ok(payload) = serde_json::to_value(&snapshot) {
        cache.put(&key, payload);
    }

    Ok(snapshot)
}
