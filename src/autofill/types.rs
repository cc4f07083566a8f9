//! Core data types for the autofill engine.
//!
//! Everything here is ephemeral: created during one scan/fill pass and
//! discarded once the response crosses the JS boundary. The only type that
//! carries a live DOM handle is [`ScoredField`], and it is valid solely
//! within the synchronous scan pass that produced it.

use serde::{Deserialize, Serialize};
use web_sys::HtmlElement;

// =============================================================================
// Field types
// =============================================================================

/// Semantic field types the engine can recognize and fill.
///
/// Declaration order is the fixed tie-break priority: when two types score
/// equally for the same element, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    FirstName,
    LastName,
    Email,
    Phone,
    Location,
    LinkedinUrl,
}

impl FieldType {
    /// All field types, in tie-break priority order.
    pub const ALL: [FieldType; 6] = [
        FieldType::FirstName,
        FieldType::LastName,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Location,
        FieldType::LinkedinUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::FirstName => "first_name",
            FieldType::LastName => "last_name",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Location => "location",
            FieldType::LinkedinUrl => "linkedin_url",
        }
    }
}

// =============================================================================
// Candidates
// =============================================================================

/// Element kind a candidate was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateTag {
    Input,
    Textarea,
}

/// DOM-free snapshot of one element's scoring-relevant attributes.
///
/// The scorer and the pure half of the scanner operate on candidates only,
/// which keeps the whole classification path testable without a browser.
#[derive(Debug, Clone)]
pub struct FieldCandidate {
    pub tag: CandidateTag,
    /// Lowercased `type` attribute; inputs default to "text".
    pub input_type: String,
    pub autocomplete: String,
    pub id: String,
    pub name: String,
    pub placeholder: String,
    /// Label text resolved from `<label>`, aria attributes, or preceding text.
    pub label: String,
    pub disabled: bool,
    pub read_only: bool,
    /// False for zero-size or hidden elements.
    pub rendered: bool,
}

impl Default for FieldCandidate {
    fn default() -> Self {
        Self {
            tag: CandidateTag::Input,
            input_type: "text".to_string(),
            autocomplete: String::new(),
            id: String::new(),
            name: String::new(),
            placeholder: String::new(),
            label: String::new(),
            disabled: false,
            read_only: false,
            rendered: true,
        }
    }
}

/// Input types that are never scored or filled.
const EXCLUDED_INPUT_TYPES: [&str; 9] = [
    "submit", "button", "file", "image", "reset", "checkbox", "radio", "hidden", "password",
];

impl FieldCandidate {
    /// Whether this element can participate in scanning at all.
    /// Excluded-type, disabled, and non-rendered elements are not candidates.
    pub fn is_candidate(&self) -> bool {
        if self.disabled || !self.rendered {
            return false;
        }
        match self.tag {
            CandidateTag::Textarea => true,
            CandidateTag::Input => !EXCLUDED_INPUT_TYPES
                .iter()
                .any(|t| self.input_type.eq_ignore_ascii_case(t)),
        }
    }

    /// The bit-exact fillable precondition: candidate plus writable.
    pub fn is_writable(&self) -> bool {
        self.is_candidate() && !self.read_only
    }
}

// =============================================================================
// Scan results
// =============================================================================

/// A classified candidate, expressed as an index into the scanned slice.
/// This is the DOM-free twin of [`ScoredField`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedField {
    pub index: usize,
    pub field_type: FieldType,
    pub score: f64,
}

/// Pure classification outcome over one candidate slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedScan {
    pub fillable: Vec<ClassifiedField>,
    /// Candidate count before thresholding. Distinguishes "no inputs yet"
    /// from "inputs present, none matched".
    pub total_relevant: usize,
    pub has_application_form: bool,
}

/// A fillable field paired with its live element handle.
///
/// Scan-scoped: the handle is only trusted within the pass that produced it
/// and is never persisted across a DOM mutation.
pub struct ScoredField {
    pub element: HtmlElement,
    pub field_type: FieldType,
    pub score: f64,
}

/// Result of scanning the current document snapshot.
pub struct FormScanResult {
    pub has_application_form: bool,
    /// Fillable fields in scan order, not score order.
    pub fillable_fields: Vec<ScoredField>,
    pub total_relevant_fields: usize,
}

// =============================================================================
// Profiles and fill results
// =============================================================================

/// User profile data, externally supplied and read-only to the core.
/// Missing fields are expected; they become skips, never errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutofillProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

impl AutofillProfile {
    /// The profile value for a field type, or None when absent or blank.
    pub fn value_for(&self, field_type: FieldType) -> Option<&str> {
        let raw = match field_type {
            FieldType::FirstName => &self.first_name,
            FieldType::LastName => &self.last_name,
            FieldType::Email => &self.email,
            FieldType::Phone => &self.phone,
            FieldType::Location => &self.location,
            FieldType::LinkedinUrl => &self.linkedin_url,
        };
        raw.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Per-field outcome of one fill pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutcome {
    pub field_type: FieldType,
    pub filled: bool,
    pub score: f64,
}

/// Aggregate result of one fill pass. Recomputed per call, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutofillResult {
    pub filled_count: usize,
    pub skipped_count: usize,
    pub fields: Vec<FieldOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_input_types_are_not_candidates() {
        for ty in ["submit", "button", "file", "image", "reset", "checkbox", "radio", "hidden"] {
            let candidate = FieldCandidate {
                input_type: ty.to_string(),
                ..Default::default()
            };
            assert!(!candidate.is_candidate(), "type={ty} should be excluded");
        }
    }

    #[test]
    fn test_textarea_is_candidate_regardless_of_type() {
        let candidate = FieldCandidate {
            tag: CandidateTag::Textarea,
            input_type: String::new(),
            ..Default::default()
        };
        assert!(candidate.is_candidate());
    }

    #[test]
    fn test_disabled_and_hidden_elements_are_not_candidates() {
        let disabled = FieldCandidate {
            disabled: true,
            ..Default::default()
        };
        assert!(!disabled.is_candidate());

        let hidden = FieldCandidate {
            rendered: false,
            ..Default::default()
        };
        assert!(!hidden.is_candidate());
    }

    #[test]
    fn test_readonly_is_candidate_but_not_writable() {
        let readonly = FieldCandidate {
            read_only: true,
            ..Default::default()
        };
        assert!(readonly.is_candidate());
        assert!(!readonly.is_writable());
    }

    #[test]
    fn test_profile_blank_values_are_absent() {
        let profile = AutofillProfile {
            first_name: Some("Jane".to_string()),
            last_name: Some("   ".to_string()),
            email: None,
            ..Default::default()
        };
        assert_eq!(profile.value_for(FieldType::FirstName), Some("Jane"));
        assert_eq!(profile.value_for(FieldType::LastName), None);
        assert_eq!(profile.value_for(FieldType::Email), None);
    }

    #[test]
    fn test_field_type_serializes_snake_case() {
        let json = serde_json::to_string(&FieldType::LinkedinUrl).unwrap();
        assert_eq!(json, "\"linkedin_url\"");
    }
}
