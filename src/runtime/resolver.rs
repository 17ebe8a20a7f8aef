use crate::assemble::page_object::ElementSpec;
use crate::browser::driver::{Driver, ElementHandle};
use crate::error::CoreError;
use crate::extract::dom_analysis::DomAnalysis;
use crate::extract::extractor::regenerate_candidates;
use crate::runtime::context::PageContextManager;
use crate::runtime::events::{HealingEvent, HealingOutcome, HealingSink};

// ============================================================================
// SelectorResolver — candidate resolution with one bounded healing pass
// ============================================================================

/// A successful resolution: the live handle, the selector that found it, and
/// whether a healing pass was needed.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub handle: ElementHandle,
    pub selector_used: String,
    pub healed: bool,
}

/// Explicit healing control flow. `Healing` can only be entered from
/// `Exhausted` and only exits to `Resolved` or `Failed`, so a second healing
/// pass is unrepresentable.
enum ResolveState {
    Resolving,
    Exhausted,
    Healing { regenerated: Vec<String> },
    Resolved(Resolution),
    Failed { attempted: Vec<String> },
}

/// Resolves logical elements to live handles.
///
/// Tries an element's candidates in priority order with a per-candidate
/// timeout. On total exhaustion it takes a fresh DOM snapshot, regenerates
/// candidates scoped to the element's role, and retries exactly once. A
/// post-heal success rewrites the element's candidate list in place with the
/// winner first — a latency optimization for later calls in the same run,
/// and the single permitted post-assembly mutation of a PageObject.
pub struct SelectorResolver {
    analyzer: Box<dyn DomAnalysis>,
    sink: Box<dyn HealingSink>,
    pub timeout_per_candidate_ms: u64,
}

impl SelectorResolver {
    pub fn new(
        analyzer: Box<dyn DomAnalysis>,
        sink: Box<dyn HealingSink>,
        timeout_per_candidate_ms: u64,
    ) -> Self {
        SelectorResolver {
            analyzer,
            sink,
            timeout_per_candidate_ms,
        }
    }

    /// Resolve the named element on the scenario's current page.
    pub fn resolve(
        &self,
        ctx: &mut PageContextManager,
        element_name: &str,
        driver: &mut dyn Driver,
    ) -> Result<Resolution, CoreError> {
        self.resolve_with_step(ctx, element_name, driver, None)
    }

    /// `resolve` with a step name attached to emitted healing events.
    fn resolve_with_step(
        &self,
        ctx: &mut PageContextManager,
        element_name: &str,
        driver: &mut dyn Driver,
        step_name: Option<&str>,
    ) -> Result<Resolution, CoreError> {
        let page = ctx.get_current_page_mut()?;
        let spec = page
            .element(element_name)
            .cloned()
            .ok_or_else(|| CoreError::SelectorResolution {
                element: element_name.to_string(),
                step: None,
                attempted: Vec::new(),
            })?;

        let mut state = ResolveState::Resolving;
        let mut regenerated_for_event: Vec<String> = Vec::new();

        loop {
            state = match state {
                ResolveState::Resolving => {
                    match self.try_candidates(&spec.selectors, driver)? {
                        Some(res) => ResolveState::Resolved(res),
                        None => ResolveState::Exhausted,
                    }
                }

                ResolveState::Exhausted => {
                    let snapshot = driver.snapshot()?;
                    let regenerated = regenerate_candidates(
                        &spec.name,
                        spec.role,
                        &snapshot,
                        self.analyzer.as_ref(),
                    );
                    regenerated_for_event = regenerated.clone();
                    ResolveState::Healing { regenerated }
                }

                ResolveState::Healing { regenerated } => {
                    match self.try_candidates(&regenerated, driver)? {
                        Some(mut res) => {
                            res.healed = true;
                            page.promote_selector(&spec.name, &res.selector_used, &regenerated);
                            ResolveState::Resolved(res)
                        }
                        None => {
                            let mut attempted = spec.selectors.clone();
                            for s in &regenerated {
                                if !attempted.contains(s) {
                                    attempted.push(s.clone());
                                }
                            }
                            ResolveState::Failed { attempted }
                        }
                    }
                }

                ResolveState::Resolved(res) => {
                    if res.healed {
                        self.sink.emit(&HealingEvent::now(
                            step_name,
                            &spec.name,
                            &spec.selectors,
                            &regenerated_for_event,
                            HealingOutcome::Healed,
                        ));
                    }
                    return Ok(res);
                }

                ResolveState::Failed { attempted } => {
                    self.sink.emit(&HealingEvent::now(
                        step_name,
                        &spec.name,
                        &spec.selectors,
                        &regenerated_for_event,
                        HealingOutcome::Failed,
                    ));
                    return Err(CoreError::SelectorResolution {
                        element: spec.name.clone(),
                        step: None,
                        attempted,
                    });
                }
            };
        }
    }

    /// Try each candidate in order; first present wins.
    fn try_candidates(
        &self,
        candidates: &[String],
        driver: &mut dyn Driver,
    ) -> Result<Option<Resolution>, CoreError> {
        for selector in candidates {
            if let Some(handle) = driver.find(selector, self.timeout_per_candidate_ms)? {
                return Ok(Some(Resolution {
                    handle,
                    selector_used: selector.clone(),
                    healed: false,
                }));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Safe operations — resolve + act, unified error taxonomy
    // ========================================================================

    pub fn safe_click(
        &self,
        ctx: &mut PageContextManager,
        element_name: &str,
        driver: &mut dyn Driver,
        step_name: &str,
    ) -> Result<(), CoreError> {
        let res = self
            .resolve_with_step(ctx, element_name, driver, Some(step_name))
            .map_err(|e| e.with_step(step_name))?;
        driver.click(&res.handle).map_err(|e| {
            wrap_action_error(e, "click", element_name).with_step(step_name)
        })
    }

    pub fn safe_set_value(
        &self,
        ctx: &mut PageContextManager,
        element_name: &str,
        value: &str,
        driver: &mut dyn Driver,
        step_name: &str,
    ) -> Result<(), CoreError> {
        let res = self
            .resolve_with_step(ctx, element_name, driver, Some(step_name))
            .map_err(|e| e.with_step(step_name))?;
        driver.set_value(&res.handle, value).map_err(|e| {
            wrap_action_error(e, "set_value", element_name).with_step(step_name)
        })
    }

    pub fn safe_get_text(
        &self,
        ctx: &mut PageContextManager,
        element_name: &str,
        driver: &mut dyn Driver,
        step_name: &str,
    ) -> Result<String, CoreError> {
        let res = self
            .resolve_with_step(ctx, element_name, driver, Some(step_name))
            .map_err(|e| e.with_step(step_name))?;
        driver.text(&res.handle).map_err(|e| {
            wrap_action_error(e, "get_text", element_name).with_step(step_name)
        })
    }

    /// Never fails: absence, resolution failure, or a driver error all
    /// report as `false`.
    pub fn safe_is_displayed(
        &self,
        ctx: &mut PageContextManager,
        element_name: &str,
        driver: &mut dyn Driver,
    ) -> bool {
        match self.resolve(ctx, element_name, driver) {
            Ok(res) => driver.is_displayed(&res.handle).unwrap_or(false),
            Err(_) => false,
        }
    }
}

/// Translate a low-level driver failure into the DriverAction kind, keeping
/// resolution errors as-is.
fn wrap_action_error(err: CoreError, action: &str, element: &str) -> CoreError {
    match err {
        e @ CoreError::SelectorResolution { .. } => e,
        other => CoreError::DriverAction {
            action: action.to_string(),
            element: element.to_string(),
            step: None,
            detail: other.to_string(),
        },
    }
}

/// Worst-case wall-clock bound for one resolve call:
/// (candidate count × per-candidate timeout) × 2 passes.
pub fn worst_case_ms(spec: &ElementSpec, timeout_per_candidate_ms: u64) -> u64 {
    (spec.selectors.len() as u64) * timeout_per_candidate_ms * 2
}
