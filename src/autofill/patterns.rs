//! Field pattern catalog: static matching rules per semantic field type.
//!
//! Pure data plus one-time regex compilation. Extending the engine with a
//! new field type means adding a [`FieldType`] variant and one catalog entry
//! here; nothing else changes.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::autofill::types::FieldType;

// =============================================================================
// Configuration
// =============================================================================

/// Tunable scoring weights and thresholds.
///
/// The defaults are the shipped values; they are deliberately configurable
/// so they can be re-tuned against a labeled form corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Exact autocomplete token match. Near-certain signal.
    pub autocomplete_weight: f64,
    /// Id attribute pattern match.
    pub id_weight: f64,
    /// Name attribute pattern match.
    pub name_weight: f64,
    /// Resolved label text pattern match.
    pub label_weight: f64,
    /// Placeholder pattern match. Least reliable signal.
    pub placeholder_weight: f64,
    /// Minimum top score for a candidate to count as fillable.
    pub accept_threshold: f64,
    /// Minimum candidate density for a page to count as an application form.
    /// A single stray email input must not register.
    pub min_form_fields: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            autocomplete_weight: 50.0,
            id_weight: 30.0,
            name_weight: 30.0,
            label_weight: 25.0,
            placeholder_weight: 15.0,
            accept_threshold: 30.0,
            min_form_fields: 3,
        }
    }
}

// =============================================================================
// Patterns
// =============================================================================

/// Matching rules for one field type. All matching is case-insensitive:
/// autocomplete tokens compare with ASCII case folding, the rest are
/// `(?i)` regexes compiled once at catalog construction.
#[derive(Debug)]
pub struct FieldPattern {
    pub field_type: FieldType,
    pub autocomplete: &'static [&'static str],
    pub label_patterns: Vec<Regex>,
    pub placeholder_patterns: Vec<Regex>,
    pub name_patterns: Vec<Regex>,
    pub id_patterns: Vec<Regex>,
}

/// The static catalog, one entry per field type, in tie-break order.
#[derive(Debug)]
pub struct PatternCatalog {
    entries: Vec<FieldPattern>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        // Static catalog patterns; a failure to compile is a programming error.
        .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
        .collect()
}

impl PatternCatalog {
    pub fn new() -> Self {
        let entries = vec![
            FieldPattern {
                field_type: FieldType::FirstName,
                autocomplete: &["given-name"],
                label_patterns: compile(&[r"first\s*name", r"given\s*name", r"forename"]),
                placeholder_patterns: compile(&[r"first\s*name", r"given\s*name"]),
                name_patterns: compile(&[r"first.?name", r"given.?name", r"^fname$", r"^first$"]),
                id_patterns: compile(&[r"first.?name", r"given.?name", r"^fname$", r"^first$"]),
            },
            FieldPattern {
                field_type: FieldType::LastName,
                autocomplete: &["family-name"],
                label_patterns: compile(&[r"last\s*name", r"family\s*name", r"surname"]),
                placeholder_patterns: compile(&[r"last\s*name", r"family\s*name", r"surname"]),
                name_patterns: compile(&[r"last.?name", r"family.?name", r"surname", r"^lname$", r"^last$"]),
                id_patterns: compile(&[r"last.?name", r"family.?name", r"surname", r"^lname$", r"^last$"]),
            },
            FieldPattern {
                field_type: FieldType::Email,
                autocomplete: &["email"],
                label_patterns: compile(&[r"e-?mail"]),
                placeholder_patterns: compile(&[r"e-?mail", r"you@", r"@example\."]),
                name_patterns: compile(&[r"e-?mail"]),
                id_patterns: compile(&[r"e-?mail"]),
            },
            FieldPattern {
                field_type: FieldType::Phone,
                autocomplete: &["tel", "tel-national"],
                label_patterns: compile(&[r"phone", r"mobile", r"telephone"]),
                placeholder_patterns: compile(&[r"phone", r"mobile", r"\(\d{3}\)"]),
                name_patterns: compile(&[r"phone", r"mobile", r"^tel$", r"telephone"]),
                id_patterns: compile(&[r"phone", r"mobile", r"^tel$", r"telephone"]),
            },
            FieldPattern {
                field_type: FieldType::Location,
                autocomplete: &["address-level2", "street-address"],
                label_patterns: compile(&[r"location", r"\bcity\b", r"address", r"\btown\b"]),
                placeholder_patterns: compile(&[r"location", r"\bcity\b", r"address"]),
                name_patterns: compile(&[r"location", r"city", r"address", r"town"]),
                id_patterns: compile(&[r"location", r"city", r"address", r"town"]),
            },
            FieldPattern {
                field_type: FieldType::LinkedinUrl,
                // No reliable autocomplete token exists; a bare "url" token
                // would claim every website field.
                autocomplete: &[],
                label_patterns: compile(&[r"linked.?in"]),
                placeholder_patterns: compile(&[r"linked.?in"]),
                name_patterns: compile(&[r"linked.?in"]),
                id_patterns: compile(&[r"linked.?in"]),
            },
        ];
        Self { entries }
    }

    /// Entries in declaration (tie-break) order.
    pub fn entries(&self) -> &[FieldPattern] {
        &self.entries
    }

    pub fn get(&self, field_type: FieldType) -> &FieldPattern {
        // Catalog order mirrors FieldType::ALL, so position lookup is exact.
        &self.entries[FieldType::ALL
            .iter()
            .position(|t| *t == field_type)
            .unwrap_or(0)]
    }
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_one_entry_per_field_type_in_order() {
        let catalog = PatternCatalog::new();
        assert_eq!(catalog.entries().len(), FieldType::ALL.len());
        for (entry, expected) in catalog.entries().iter().zip(FieldType::ALL.iter()) {
            assert_eq!(entry.field_type, *expected);
        }
    }

    #[test]
    fn test_label_patterns_are_case_insensitive() {
        let catalog = PatternCatalog::new();
        let first = catalog.get(FieldType::FirstName);
        assert!(first.label_patterns.iter().any(|r| r.is_match("First Name")));
        assert!(first.label_patterns.iter().any(|r| r.is_match("FIRSTNAME")));
    }

    #[test]
    fn test_email_patterns_match_both_spellings() {
        let catalog = PatternCatalog::new();
        let email = catalog.get(FieldType::Email);
        assert!(email.name_patterns.iter().any(|r| r.is_match("user_email")));
        assert!(email.name_patterns.iter().any(|r| r.is_match("E-Mail")));
    }

    #[test]
    fn test_anchored_name_patterns_do_not_overmatch() {
        let catalog = PatternCatalog::new();
        let first = catalog.get(FieldType::FirstName);
        // "fname" only matches as the whole attribute value.
        assert!(first.name_patterns.iter().any(|r| r.is_match("fname")));
        assert!(!first.name_patterns.iter().any(|r| r.is_match("nickfname_x")));
    }

    #[test]
    fn test_default_config_thresholds() {
        let config = ScoringConfig::default();
        assert!(config.autocomplete_weight >= config.accept_threshold);
        assert!(config.placeholder_weight < config.accept_threshold);
        assert!(config.min_form_fields > 1);
    }
}
