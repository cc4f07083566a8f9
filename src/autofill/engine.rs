//! Autofill engine: the façade orchestrating scanner and filler.
//!
//! One engine instance lives per injected page context. `scan` always
//! re-queries the DOM; the cached result exists only for last-result
//! retrieval, never for correctness. Filling is a rescan followed by one
//! write per matched field; empty profile values are normal skips.

use web_sys::Document;

use crate::autofill::filling::fill_field;
use crate::autofill::patterns::ScoringConfig;
use crate::autofill::scanning::{classify, snapshot_document};
use crate::autofill::scoring::FieldScorer;
use crate::autofill::types::{
    AutofillProfile, AutofillResult, FieldOutcome, FieldType, FormScanResult, ScoredField,
};

// =============================================================================
// Fill planning (pure)
// =============================================================================

/// One matched field with the profile value destined for it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedField {
    pub field_type: FieldType,
    pub score: f64,
    pub value: Option<String>,
}

/// Map matched fields to profile values. Absent or blank values stay None.
pub fn plan_fill(fields: &[(FieldType, f64)], profile: &AutofillProfile) -> Vec<PlannedField> {
    fields
        .iter()
        .map(|(field_type, score)| PlannedField {
            field_type: *field_type,
            score: *score,
            value: profile.value_for(*field_type).map(str::to_string),
        })
        .collect()
}

/// Execute a fill plan through a write callback and aggregate the outcome.
/// A None value or a rejected write both count as skips; neither is an error.
pub(crate) fn execute_plan(
    plan: &[PlannedField],
    mut write: impl FnMut(usize, &str) -> bool,
) -> AutofillResult {
    let mut result = AutofillResult::default();

    for (index, planned) in plan.iter().enumerate() {
        let filled = match planned.value.as_deref() {
            Some(value) => write(index, value),
            None => false,
        };
        if filled {
            result.filled_count += 1;
        } else {
            result.skipped_count += 1;
        }
        result.fields.push(FieldOutcome {
            field_type: planned.field_type,
            filled,
            score: planned.score,
        });
    }

    result
}

// =============================================================================
// Engine
// =============================================================================

/// Stateful façade holding the last scan result.
pub struct AutofillEngine {
    scorer: FieldScorer,
    last_scan: Option<FormScanResult>,
}

impl AutofillEngine {
    pub fn new() -> Self {
        Self::with_config(ScoringConfig::default())
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self {
            scorer: FieldScorer::with_config(config),
            last_scan: None,
        }
    }

    /// Scan the page for fillable fields. Always re-queries the DOM.
    pub fn scan(&mut self, document: &Document) -> &FormScanResult {
        let pairs = snapshot_document(document);
        let candidates: Vec<_> = pairs.iter().map(|(_, c)| c.clone()).collect();
        let classified = classify(&self.scorer, &candidates);

        let fillable_fields = classified
            .fillable
            .iter()
            .map(|field| ScoredField {
                element: pairs[field.index].0.clone(),
                field_type: field.field_type,
                score: field.score,
            })
            .collect();

        self.last_scan.insert(FormScanResult {
            has_application_form: classified.has_application_form,
            fillable_fields,
            total_relevant_fields: classified.total_relevant,
        })
    }

    /// The last scan result without re-scanning.
    pub fn last_scan_result(&self) -> Option<&FormScanResult> {
        self.last_scan.as_ref()
    }

    /// Fill all detected fields with profile data.
    pub fn fill(&mut self, document: &Document, profile: &AutofillProfile) -> AutofillResult {
        let scan = self.scan(document);
        let matched: Vec<(FieldType, f64)> = scan
            .fillable_fields
            .iter()
            .map(|f| (f.field_type, f.score))
            .collect();
        let plan = plan_fill(&matched, profile);

        let elements: Vec<_> = scan
            .fillable_fields
            .iter()
            .map(|f| f.element.clone())
            .collect();
        execute_plan(&plan, |index, value| fill_field(&elements[index], value))
    }

    pub fn has_fillable_fields(&mut self, document: &Document) -> bool {
        !self.scan(document).fillable_fields.is_empty()
    }

    pub fn is_application_form(&mut self, document: &Document) -> bool {
        self.scan(document).has_application_form
    }

    pub fn fillable_field_count(&mut self, document: &Document) -> usize {
        self.scan(document).fillable_fields.len()
    }

    /// Drop cached state. Test isolation only.
    pub fn reset(&mut self) {
        self.last_scan = None;
    }
}

impl Default for AutofillEngine {
    fn default() -> Self {
        Self::new()
    }
}
