//! Content-script orchestrator.
//!
//! One [`ContentScript`] context is constructed per injection and drives the
//! whole in-page lifecycle: initial detection + scan, a bounded retry loop
//! for pages whose inputs have not rendered yet, and a debounced rescan when
//! DOM mutations introduce new inputs. Only the top-level frame runs the
//! loop and volunteers reports; embedded frames answer direct requests but
//! stay otherwise silent to avoid duplicate/conflicting messages.
//!
//! The retry/settle decision logic is pure ([`ScanLoopState`]) so it can be
//! unit tested without a browser.

pub mod messages;
pub mod timer;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, MutationRecord, Window};

use crate::autofill::engine::AutofillEngine;
use crate::content::messages::{
    post_message, AutofillFormResponse, GetTextResponse, InboundMessage, OutboundMessage,
    ScanFieldsResponse,
};
use crate::content::timer::DelayedTask;
use crate::detect::{JobPageDetector, PageSnapshot};

/// Debounce window for mutation-driven rescans.
pub const DEBOUNCE_MS: i32 = 250;

// =============================================================================
// Scan loop state (pure)
// =============================================================================

/// Lifecycle phase of the per-frame scan loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Scanning,
    AwaitingRetry,
    Stable,
}

/// Bounded retry schedule for pages that render their form late.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval_ms: i32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval_ms: 1000,
        }
    }
}

/// What the loop should do after a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Retry,
    Settle,
}

/// Cross-call scalar state of the scan loop. This is the only state the
/// content script keeps between passes; scored fields never survive a pass.
#[derive(Debug, Clone)]
pub struct ScanLoopState {
    pub phase: Phase,
    pub attempts: u32,
    pub last_fillable_count: usize,
    pub last_has_form: bool,
}

impl ScanLoopState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Initial,
            attempts: 0,
            last_fillable_count: 0,
            last_has_form: false,
        }
    }

    /// Record one retry-loop scan and decide what happens next.
    /// Retries only while the page shows zero raw candidates and budget
    /// remains; anything else settles.
    pub fn on_scan(
        &mut self,
        policy: &RetryPolicy,
        total_relevant: usize,
        fillable_count: usize,
        has_form: bool,
    ) -> LoopAction {
        self.phase = Phase::Scanning;
        self.attempts += 1;
        self.last_fillable_count = fillable_count;
        self.last_has_form = has_form;

        if total_relevant == 0 && self.attempts < policy.max_attempts {
            self.phase = Phase::AwaitingRetry;
            LoopAction::Retry
        } else {
            self.phase = Phase::Stable;
            LoopAction::Settle
        }
    }

    /// Record a mutation-driven rescan. Does not consume a retry attempt.
    /// Returns true when the result should be reported (and any pending
    /// retry cancelled); a rescan that still sees nothing changes nothing.
    pub fn on_mutation_scan(
        &mut self,
        total_relevant: usize,
        fillable_count: usize,
        has_form: bool,
    ) -> bool {
        if total_relevant == 0 {
            return false;
        }
        self.phase = Phase::Stable;
        self.last_fillable_count = fillable_count;
        self.last_has_form = has_form;
        true
    }
}

impl Default for ScanLoopState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Content script context
// =============================================================================

struct ContentContext {
    document: Document,
    engine: AutofillEngine,
    detector: JobPageDetector,
    policy: RetryPolicy,
    state: ScanLoopState,
    retry_timer: DelayedTask,
    debounce_timer: DelayedTask,
    observer: Option<MutationObserver>,
    observer_callback: Option<Closure<dyn FnMut(js_sys::Array, MutationObserver)>>,
    top_frame: bool,
}

/// Per-injection content script façade, exported to the JS loader.
#[wasm_bindgen]
pub struct ContentScript {
    ctx: Rc<RefCell<ContentContext>>,
}

#[wasm_bindgen]
impl ContentScript {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<ContentScript, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let top_frame = is_top_frame(&window);

        Ok(ContentScript {
            ctx: Rc::new(RefCell::new(ContentContext {
                document,
                engine: AutofillEngine::new(),
                detector: JobPageDetector::new(),
                policy: RetryPolicy::default(),
                state: ScanLoopState::new(),
                retry_timer: DelayedTask::new(),
                debounce_timer: DelayedTask::new(),
                observer: None,
                observer_callback: None,
                top_frame,
            })),
        })
    }

    /// Whether this instance runs in the outermost browsing context.
    #[wasm_bindgen(js_name = isTopFrame)]
    pub fn is_top(&self) -> bool {
        self.ctx.borrow().top_frame
    }

    /// Entry point, called by the JS loader on load-complete.
    ///
    /// Embedded frames stop here: they answer direct requests through
    /// [`ContentScript::handle_message`] but never run the loop, install the
    /// observer, or volunteer reports.
    pub fn bootstrap(&self) {
        if !self.ctx.borrow().top_frame {
            return;
        }
        Self::run_detection(&self.ctx);
        Self::run_scan_cycle(&self.ctx);
        if let Err(err) = Self::install_observer(&self.ctx) {
            web_sys::console::warn_2(
                &"[ContentScript] mutation observer install failed:".into(),
                &err,
            );
        }
    }

    /// Handle one request from the popup/background. Always resolves; an
    /// unrecognized or malformed message resolves to undefined.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> js_sys::Promise {
        let parsed = serde_wasm_bindgen::from_value::<InboundMessage>(message)
            .unwrap_or(InboundMessage::Unknown);

        let value = {
            let mut guard = self.ctx.borrow_mut();
            let ctx = &mut *guard;
            match parsed {
                InboundMessage::GetDetection => {
                    let snapshot = PageSnapshot::capture(&ctx.document);
                    serde_wasm_bindgen::to_value(&ctx.detector.detect(&snapshot))
                }
                InboundMessage::ScanFields => {
                    let scan = ctx.engine.scan(&ctx.document);
                    serde_wasm_bindgen::to_value(&ScanFieldsResponse {
                        fillable_field_count: scan.fillable_fields.len(),
                        has_application_form: scan.has_application_form,
                    })
                }
                InboundMessage::AutofillForm { profile } => {
                    let result = ctx.engine.fill(&ctx.document, &profile);
                    serde_wasm_bindgen::to_value(&AutofillFormResponse {
                        filled_count: result.filled_count,
                    })
                }
                InboundMessage::GetText => {
                    let text = ctx
                        .document
                        .body()
                        .map(|body| body.inner_text())
                        .unwrap_or_default();
                    serde_wasm_bindgen::to_value(&GetTextResponse { text })
                }
                InboundMessage::Unknown => Ok(JsValue::UNDEFINED),
            }
        };

        js_sys::Promise::resolve(&value.unwrap_or(JsValue::UNDEFINED))
    }
}

impl ContentScript {
    fn run_detection(ctx: &Rc<RefCell<ContentContext>>) {
        let guard = ctx.borrow();
        let snapshot = PageSnapshot::capture(&guard.document);
        let result = guard.detector.detect(&snapshot);
        web_sys::console::log_1(
            &format!(
                "[ContentScript] detection: job_page={} score={}",
                result.is_job_page, result.score
            )
            .into(),
        );
        post_message(&OutboundMessage::DetectionResult {
            is_job_page: result.is_job_page,
            score: result.score,
            signals: result.signals,
            url: snapshot.url,
        });
    }

    fn run_scan_cycle(ctx: &Rc<RefCell<ContentContext>>) {
        let action = {
            let mut guard = ctx.borrow_mut();
            let inner = &mut *guard;
            let scan = inner.engine.scan(&inner.document);
            let total = scan.total_relevant_fields;
            let fillable = scan.fillable_fields.len();
            let has_form = scan.has_application_form;
            inner.state.on_scan(&inner.policy, total, fillable, has_form)
        };

        match action {
            LoopAction::Retry => {
                let next = ctx.clone();
                let mut guard = ctx.borrow_mut();
                let delay = guard.policy.interval_ms;
                if guard
                    .retry_timer
                    .schedule(delay, move || Self::run_scan_cycle(&next))
                    .is_err()
                {
                    // No timer available: settle with what we have.
                    guard.state.phase = Phase::Stable;
                    drop(guard);
                    Self::report_form_state(ctx);
                }
            }
            LoopAction::Settle => Self::report_form_state(ctx),
        }
    }

    fn run_mutation_rescan(ctx: &Rc<RefCell<ContentContext>>) {
        let should_report = {
            let mut guard = ctx.borrow_mut();
            let inner = &mut *guard;
            let scan = inner.engine.scan(&inner.document);
            let total = scan.total_relevant_fields;
            let fillable = scan.fillable_fields.len();
            let has_form = scan.has_application_form;
            let report = inner.state.on_mutation_scan(total, fillable, has_form);
            if report {
                inner.retry_timer.cancel();
            }
            report
        };
        if should_report {
            Self::report_form_state(ctx);
        }
    }

    fn report_form_state(ctx: &Rc<RefCell<ContentContext>>) {
        let guard = ctx.borrow();
        if !guard.top_frame {
            return;
        }
        post_message(&OutboundMessage::FormDetectionUpdate {
            has_application_form: guard.state.last_has_form,
            fillable_field_count: guard.state.last_fillable_count,
        });
    }

    /// Install the DOM-change subscription, once, top frame only.
    fn install_observer(ctx: &Rc<RefCell<ContentContext>>) -> Result<(), JsValue> {
        let mut guard = ctx.borrow_mut();
        if !guard.top_frame || guard.observer.is_some() {
            return Ok(());
        }

        let outer = ctx.clone();
        let callback = Closure::wrap(Box::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                if !mutations_introduce_inputs(&records) {
                    return;
                }
                // A new burst supersedes the pending debounce shot, so
                // mutation storms coalesce into one rescan.
                let rescan = outer.clone();
                let _ = outer
                    .borrow_mut()
                    .debounce_timer
                    .schedule(DEBOUNCE_MS, move || Self::run_mutation_rescan(&rescan));
            },
        )
            as Box<dyn FnMut(js_sys::Array, MutationObserver)>);

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer.observe_with_options(guard.document.as_ref(), &init)?;

        guard.observer = Some(observer);
        guard.observer_callback = Some(callback);
        Ok(())
    }
}

impl Drop for ContentContext {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

/// True in the outermost browsing context. A cross-origin error while
/// reaching `window.top` means we are embedded.
fn is_top_frame(window: &Window) -> bool {
    match window.top() {
        Ok(Some(top)) => js_sys::Object::is(top.as_ref(), window.as_ref()),
        _ => false,
    }
}

/// Did any mutation batch add an input/textarea, directly or nested?
fn mutations_introduce_inputs(records: &js_sys::Array) -> bool {
    for record in records.iter() {
        let Ok(record) = record.dyn_into::<MutationRecord>() else {
            continue;
        };
        let added = record.added_nodes();
        for i in 0..added.length() {
            let Some(node) = added.get(i) else { continue };
            let Some(element) = node.dyn_ref::<Element>() else {
                continue;
            };
            let tag = element.tag_name();
            if tag.eq_ignore_ascii_case("input") || tag.eq_ignore_ascii_case("textarea") {
                return true;
            }
            if matches!(element.query_selector("input, textarea"), Ok(Some(_))) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Retry loop decisions
    // -------------------------------------------------------------------------
    #[test]
    fn test_inputs_at_first_scan_settle_immediately() {
        let policy = RetryPolicy::default();
        let mut state = ScanLoopState::new();
        let action = state.on_scan(&policy, 4, 4, true);
        assert_eq!(action, LoopAction::Settle);
        assert_eq!(state.phase, Phase::Stable);
        assert_eq!(state.attempts, 1);
        assert_eq!(state.last_fillable_count, 4);
        assert!(state.last_has_form);
    }

    #[test]
    fn test_empty_page_schedules_retry() {
        let policy = RetryPolicy::default();
        let mut state = ScanLoopState::new();
        let action = state.on_scan(&policy, 0, 0, false);
        assert_eq!(action, LoopAction::Retry);
        assert_eq!(state.phase, Phase::AwaitingRetry);
        assert_eq!(state.attempts, 1);
    }

    #[test]
    fn test_retry_budget_exhausts_to_stable() {
        let policy = RetryPolicy::default();
        let mut state = ScanLoopState::new();
        for attempt in 1..policy.max_attempts {
            let action = state.on_scan(&policy, 0, 0, false);
            assert_eq!(action, LoopAction::Retry, "attempt {attempt}");
        }
        // Fifth and final attempt settles even with nothing found.
        let action = state.on_scan(&policy, 0, 0, false);
        assert_eq!(action, LoopAction::Settle);
        assert_eq!(state.phase, Phase::Stable);
        assert_eq!(state.attempts, policy.max_attempts);
        assert!(!state.last_has_form);
    }

    // -------------------------------------------------------------------------
    // Mutation-driven rescans
    // -------------------------------------------------------------------------
    #[test]
    fn test_late_rendered_form_settles_after_two_attempts() {
        // Page has 0 inputs at load and gains 3 between the first retry and
        // the second: initial scan, one retry, then the mutation path settles
        // the loop. Exactly 2 loop attempts, never 5.
        let policy = RetryPolicy::default();
        let mut state = ScanLoopState::new();

        assert_eq!(state.on_scan(&policy, 0, 0, false), LoopAction::Retry);
        assert_eq!(state.on_scan(&policy, 0, 0, false), LoopAction::Retry);

        let reported = state.on_mutation_scan(3, 3, true);
        assert!(reported);
        assert_eq!(state.phase, Phase::Stable);
        assert_eq!(state.attempts, 2);
        assert_eq!(state.last_fillable_count, 3);
        assert!(state.last_has_form);
    }

    #[test]
    fn test_mutation_scan_without_candidates_changes_nothing() {
        let policy = RetryPolicy::default();
        let mut state = ScanLoopState::new();
        state.on_scan(&policy, 0, 0, false);

        let reported = state.on_mutation_scan(0, 0, false);
        assert!(!reported);
        assert_eq!(state.phase, Phase::AwaitingRetry);
        assert_eq!(state.attempts, 1);
    }

    #[test]
    fn test_mutation_scan_updates_a_stable_page() {
        let policy = RetryPolicy::default();
        let mut state = ScanLoopState::new();
        state.on_scan(&policy, 2, 1, false);
        assert_eq!(state.phase, Phase::Stable);

        // Client-side rendering added a full application form later.
        let reported = state.on_mutation_scan(5, 4, true);
        assert!(reported);
        assert_eq!(state.last_fillable_count, 4);
        assert!(state.last_has_form);
        assert_eq!(state.attempts, 1);
    }

    #[test]
    fn test_counts_refresh_on_every_loop_scan() {
        let policy = RetryPolicy::default();
        let mut state = ScanLoopState::new();
        state.on_scan(&policy, 3, 2, false);
        assert_eq!(state.last_fillable_count, 2);
        state.on_scan(&policy, 6, 5, true);
        assert_eq!(state.last_fillable_count, 5);
        assert!(state.last_has_form);
    }
}
