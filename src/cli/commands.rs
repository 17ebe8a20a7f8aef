use std::path::Path;

use crate::assemble::page_object::Role;
use crate::browser::driver::Driver;
use crate::browser::session::BrowserSession;
use crate::cache::dom_cache::{DomCache, cache_key};
use crate::classify::classifier::classify_steps;
use crate::classify::page_info::PageInfo;
use crate::cli::config::AppConfig;
use crate::emit::emitter::sanitize_filename;
use crate::error::CoreError;
use crate::extract::dom_analysis::{DomSnapshot, HeuristicAnalyzer};
use crate::extract::extractor::extract_stubs;
use crate::generate::scenario::{HttpScenarioGenerator, MockScenarioGenerator, ScenarioGenerator};
use crate::instruction::instruction_model::{InstructionSet, Step};
use crate::instruction::loader::load_instruction_set;
use crate::runtime::context::PageContextManager;
use crate::runtime::events::HealingLogger;
use crate::runtime::resolver::SelectorResolver;
use crate::{GenerationOutput, fetch_snapshot, run_generation};

// ============================================================================
// generate subcommand
// ============================================================================

pub fn cmd_generate(
    input: &str,
    output_dir: &str,
    generator_name: &str,
    offline: bool,
    verbose: u8,
    llm_endpoint: Option<&str>,
    llm_model: Option<&str>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let set = load_instruction_set(input)?;
    let cache = cache_from_config(config);
    let generator = build_generator(generator_name, llm_endpoint, llm_model, config);

    if verbose > 0 {
        eprintln!(
            "Generating artifacts for '{}' ({} test cases, {} declared pages)...",
            set.project,
            set.test_cases.len(),
            set.pages.len()
        );
    }

    let snapshot = if offline {
        cached_snapshot(&cache, &set.url)
    } else {
        let mut session = BrowserSession::launch()?;
        let snapshot = fetch_snapshot(&mut session, &cache, &set.url)?;
        session.quit()?;
        snapshot
    };

    // Everything renders in memory first; a failure here leaves no files
    let output = run_generation(&set, &snapshot, &HeuristicAnalyzer, generator.as_ref())?;
    write_artifacts(&set, &output, output_dir, verbose)?;

    println!(
        "Generated 1 feature, 1 step-definition file and {} page objects in {}/",
        output.registry.len(),
        output_dir
    );
    Ok(())
}

/// Write the fully rendered artifact set to disk.
fn write_artifacts(
    set: &InstructionSet,
    output: &GenerationOutput,
    output_dir: &str,
    verbose: u8,
) -> Result<(), CoreError> {
    let base = Path::new(output_dir);
    let project = sanitize_filename(&set.project);

    for sub in ["features", "steps", "pages"] {
        std::fs::create_dir_all(base.join(sub)).map_err(|e| CoreError::Io {
            context: format!("creating {}/{}", output_dir, sub),
            source: e,
        })?;
    }

    let mut files: Vec<(std::path::PathBuf, &str)> = vec![
        (
            base.join("features").join(format!("{}.feature", project)),
            output.artifacts.feature.as_str(),
        ),
        (
            base.join("steps").join(format!("{}.steps.js", project)),
            output.artifacts.step_definitions.as_str(),
        ),
    ];
    for (page_name, source) in &output.artifacts.page_objects {
        files.push((
            base.join("pages")
                .join(format!("{}.page.js", sanitize_filename(page_name))),
            source.as_str(),
        ));
    }

    for (path, content) in files {
        std::fs::write(&path, content).map_err(|e| CoreError::Io {
            context: format!("writing {}", path.display()),
            source: e,
        })?;
        if verbose > 0 {
            eprintln!("  Wrote: {}", path.display());
        }
    }

    Ok(())
}

// ============================================================================
// run subcommand
// ============================================================================

/// Execute every test case sequentially against a live session. A step
/// failure aborts its scenario only; later scenarios still run. Returns
/// whether every scenario passed.
pub fn cmd_run(
    input: &str,
    timeout_ms: Option<u64>,
    healing_log: &str,
    verbose: u8,
    config: &AppConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let set = load_instruction_set(input)?;
    let cache = cache_from_config(config);

    let mut session = BrowserSession::launch()?;
    let snapshot = fetch_snapshot(&mut session, &cache, &set.url)?;

    let output = run_generation(&set, &snapshot, &HeuristicAnalyzer, &MockScenarioGenerator)?;

    let resolver = SelectorResolver::new(
        Box::new(HeuristicAnalyzer),
        Box::new(HealingLogger::new(healing_log)),
        timeout_ms.unwrap_or(config.resolver.timeout_per_candidate_ms),
    );

    let steps = set.all_steps();
    let pages = classify_steps(&steps, &set.pages);

    let mut all_passed = true;
    let mut step_offset = 0usize;

    for tc in &set.test_cases {
        if verbose > 0 {
            eprintln!("Running scenario: {}", tc.name);
        }

        // Each scenario owns a fresh context over its own registry copy
        let mut ctx = PageContextManager::new(output.registry.clone());
        session.navigate(&set.url)?;

        let mut passed = true;
        for (i, step) in tc.steps.iter().enumerate() {
            let global_idx = step_offset + i;
            match run_step(step, global_idx, &pages, &mut ctx, &resolver, &mut session) {
                Ok(()) => {
                    if verbose > 1 {
                        eprintln!("  ok: {}", step.text);
                    }
                }
                Err(e) => {
                    eprintln!("  FAILED: {} — {}", step.text, e);
                    passed = false;
                    break;
                }
            }
        }

        step_offset += tc.steps.len();
        println!("{}: {}", tc.name, if passed { "PASS" } else { "FAIL" });
        all_passed &= passed;
    }

    session.quit()?;
    Ok(all_passed)
}

/// Execute one step: move the page cursor if classification puts this step
/// on a different page, then perform the extracted action via the safe ops.
fn run_step(
    step: &Step,
    step_index: usize,
    pages: &[PageInfo],
    ctx: &mut PageContextManager,
    resolver: &SelectorResolver,
    driver: &mut dyn Driver,
) -> Result<(), CoreError> {
    if let Some(page) = primary_page(step, step_index, pages) {
        if ctx.current_page_name() != Some(page.as_str()) {
            ctx.set_current_page(&page)
                .map_err(|e| e.with_step(&step.text))?;
        }
    }

    let stubs = extract_stubs(&step.text);
    let Some(stub) = stubs.first() else {
        // Navigation/wait style step: nothing to resolve
        return Ok(());
    };

    match stub.role {
        Role::Input => {
            let value = quoted_value(&step.text).unwrap_or_default();
            resolver.safe_set_value(ctx, &stub.name, &value, driver, &step.text)
        }
        Role::Button | Role::Link => resolver.safe_click(ctx, &stub.name, driver, &step.text),
        Role::Text => {
            if resolver.safe_is_displayed(ctx, &stub.name, driver) {
                Ok(())
            } else {
                Err(CoreError::DriverAction {
                    action: "is_displayed".into(),
                    element: stub.name.clone(),
                    step: Some(step.text.clone()),
                    detail: "element not displayed".into(),
                })
            }
        }
    }
}

/// The page this step was classified into: explicit tag first, then the
/// first (declaration-order) page whose step list contains it.
fn primary_page(step: &Step, step_index: usize, pages: &[PageInfo]) -> Option<String> {
    if let Some(tag) = &step.page {
        return Some(tag.clone());
    }
    pages
        .iter()
        .find(|p| p.step_indices.contains(&step_index))
        .map(|p| p.name.clone())
}

/// First quoted literal in the step text, used as the fill value.
fn quoted_value(text: &str) -> Option<String> {
    for quote in ['\'', '"'] {
        let mut parts = text.splitn(3, quote);
        parts.next()?;
        if let Some(value) = parts.next() {
            if parts.next().is_some() {
                return Some(value.to_string());
            }
        }
    }
    None
}

// ============================================================================
// purge-cache subcommand
// ============================================================================

pub fn cmd_purge_cache(config: &AppConfig, verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let cache = cache_from_config(config);
    cache.purge_expired();
    if verbose > 0 {
        eprintln!("Purged expired entries from {}", config.cache.dir);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn cache_from_config(config: &AppConfig) -> DomCache {
    DomCache::new(
        Path::new(&config.cache.dir),
        (config.cache.ttl_secs as u128) * 1000,
    )
}

/// Snapshot from cache only (offline mode). Misses degrade to an empty
/// snapshot: extraction then falls back to name-derived selector guesses.
fn cached_snapshot(cache: &DomCache, url: &str) -> DomSnapshot {
    cache
        .get(&cache_key(url))
        .and_then(|payload| serde_json::from_value(payload).ok())
        .unwrap_or_else(DomSnapshot::empty)
}

/// Build the scenario generator backend by name.
fn build_generator(
    name: &str,
    llm_endpoint: Option<&str>,
    llm_model: Option<&str>,
    config: &AppConfig,
) -> Box<dyn ScenarioGenerator> {
    match name {
        "llm" => {
            let defaults = HttpScenarioGenerator::default();
            Box::new(HttpScenarioGenerator {
                endpoint: llm_endpoint
                    .map(|s| s.to_string())
                    .or_else(|| config.llm.endpoint.clone())
                    .unwrap_or(defaults.endpoint),
                model: llm_model
                    .map(|s| s.to_string())
                    .or_else(|| config.llm.model.clone())
                    .unwrap_or(defaults.model),
                max_attempts: config.llm.max_attempts,
                retry_delay_ms: config.llm.retry_delay_ms,
            })
        }
        _ => Box::new(MockScenarioGenerator),
    }
}
