//! Autofill module: fills job application forms from profile data.
//!
//! Heuristic scoring for field classification, native prototype setters for
//! writes that survive React/Vue-style controlled inputs.

pub mod engine;
pub mod filling;
pub mod patterns;
pub mod scanning;
pub mod scoring;
pub mod types;

pub use engine::{plan_fill, AutofillEngine, PlannedField};
pub use filling::{fill_field, set_native_value};
pub use patterns::{FieldPattern, PatternCatalog, ScoringConfig};
pub use scanning::{classify, snapshot_document};
pub use scoring::FieldScorer;
pub use types::*;
