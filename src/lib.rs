//! Tarnished Core: Autofill Engine + Job Posting Detector
//!
//! The Rust/WASM in-page core of the Tarnished job-tracker extension. Runs
//! inside the content script of arbitrary, previously unseen pages with no
//! server round trip, and must degrade gracefully rather than corrupt page
//! state.
//!
//! # Architecture
//!
//! ## Autofill (form scanning + filling)
//! - `autofill/patterns.rs` - Static per-field-type matching rules + tunable config
//! - `autofill/scoring.rs` - FieldScorer: additive weighted field classification
//! - `autofill/scanning.rs` - Form scanner: candidate snapshot + form-density rule
//! - `autofill/filling.rs` - Native prototype-setter writes that survive React/Vue
//! - `autofill/engine.rs` - AutofillEngine: scan/fill façade with last-result cache
//!
//! ## Detection
//! - `detect.rs` - JobPageDetector: scored-signal job listing classifier
//!
//! ## Orchestration
//! - `content/mod.rs` - ContentScript: retry loop, debounced rescans, messaging
//! - `content/timer.rs` - Single-shot cancel-on-supersede delayed tasks
//! - `content/messages.rs` - Extension runtime message contract
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { ContentScript } from 'tarnished-core';
//!
//! await init();
//!
//! const script = new ContentScript();
//!
//! // Kick off detection + the scan loop (top frame only).
//! script.bootstrap();
//!
//! // Wire the extension runtime channel.
//! browser.runtime.onMessage.addListener((msg) => script.handleMessage(msg));
//! ```

pub mod autofill;
pub mod content;
pub mod detect;

pub use autofill::*;
pub use content::{ContentScript, LoopAction, Phase, RetryPolicy, ScanLoopState};
pub use detect::{DetectionResult, DetectorConfig, JobPageDetector, PageSnapshot};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("tarnished-core v{}", env!("CARGO_PKG_VERSION"))
}
