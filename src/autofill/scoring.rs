//! Field scorer: classifies one candidate element against the catalog.
//!
//! Scoring is a weighted sum of independent signals, never multiplicative,
//! so a strong signal cannot be erased by a missing weak one. The scorer is
//! pure: no DOM access, no side effects, no mutation of the candidate.

use crate::autofill::patterns::{FieldPattern, PatternCatalog, ScoringConfig};
use crate::autofill::types::{FieldCandidate, FieldType};

/// Scores candidates against the pattern catalog.
#[derive(Debug)]
pub struct FieldScorer {
    catalog: PatternCatalog,
    config: ScoringConfig,
}

impl FieldScorer {
    pub fn new() -> Self {
        Self::with_config(ScoringConfig::default())
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self {
            catalog: PatternCatalog::new(),
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one candidate against every field type, in catalog order.
    /// Non-candidates (excluded type, disabled, hidden) score nothing.
    pub fn score(&self, candidate: &FieldCandidate) -> Vec<(FieldType, f64)> {
        if !candidate.is_candidate() {
            return Vec::new();
        }
        self.catalog
            .entries()
            .iter()
            .map(|pattern| (pattern.field_type, self.score_against(candidate, pattern)))
            .collect()
    }

    /// The winning classification for a candidate, if any signal fired.
    ///
    /// Ties are broken by catalog declaration order: the comparison is
    /// strictly-greater, so the first entry to reach the top score keeps it.
    pub fn best_match(&self, candidate: &FieldCandidate) -> Option<(FieldType, f64)> {
        let mut best: Option<(FieldType, f64)> = None;
        for (field_type, score) in self.score(candidate) {
            if score <= 0.0 {
                continue;
            }
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((field_type, score)),
            }
        }
        best
    }

    fn score_against(&self, candidate: &FieldCandidate, pattern: &FieldPattern) -> f64 {
        let mut score = 0.0;

        let autocomplete = candidate.autocomplete.trim();
        if !autocomplete.is_empty()
            && pattern
                .autocomplete
                .iter()
                .any(|token| autocomplete.eq_ignore_ascii_case(token))
        {
            score += self.config.autocomplete_weight;
        }

        if matches_any(&pattern.id_patterns, &candidate.id) {
            score += self.config.id_weight;
        }
        if matches_any(&pattern.name_patterns, &candidate.name) {
            score += self.config.name_weight;
        }
        if matches_any(&pattern.label_patterns, &candidate.label) {
            score += self.config.label_weight;
        }
        if matches_any(&pattern.placeholder_patterns, &candidate.placeholder) {
            score += self.config.placeholder_weight;
        }

        score
    }
}

impl Default for FieldScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_any(patterns: &[regex::Regex], text: &str) -> bool {
    !text.is_empty() && patterns.iter().any(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> FieldScorer {
        FieldScorer::new()
    }

    // -------------------------------------------------------------------------
    // Autocomplete is the near-certain signal
    // -------------------------------------------------------------------------
    #[test]
    fn test_autocomplete_email_wins_at_max_single_signal_weight() {
        let scorer = scorer();
        let candidate = FieldCandidate {
            autocomplete: "email".to_string(),
            id: "x1".to_string(),
            name: "q".to_string(),
            ..Default::default()
        };
        let (field_type, score) = scorer.best_match(&candidate).unwrap();
        assert_eq!(field_type, FieldType::Email);
        assert_eq!(score, scorer.config().autocomplete_weight);
    }

    #[test]
    fn test_autocomplete_is_case_insensitive() {
        let scorer = scorer();
        let candidate = FieldCandidate {
            autocomplete: "Given-Name".to_string(),
            ..Default::default()
        };
        let (field_type, _) = scorer.best_match(&candidate).unwrap();
        assert_eq!(field_type, FieldType::FirstName);
    }

    // -------------------------------------------------------------------------
    // Signals are additive
    // -------------------------------------------------------------------------
    #[test]
    fn test_signals_add_up() {
        let scorer = scorer();
        let candidate = FieldCandidate {
            name: "first_name".to_string(),
            id: "first-name".to_string(),
            label: "First Name".to_string(),
            placeholder: "First name".to_string(),
            ..Default::default()
        };
        let config = scorer.config();
        let expected = config.id_weight
            + config.name_weight
            + config.label_weight
            + config.placeholder_weight;
        let (field_type, score) = scorer.best_match(&candidate).unwrap();
        assert_eq!(field_type, FieldType::FirstName);
        assert_eq!(score, expected);
    }

    // -------------------------------------------------------------------------
    // Tie-break follows catalog order
    // -------------------------------------------------------------------------
    #[test]
    fn test_tie_breaks_by_declaration_order() {
        let scorer = scorer();
        // "name" matches both first and last name patterns at equal weight.
        let candidate = FieldCandidate {
            label: "first name or family name".to_string(),
            ..Default::default()
        };
        let scores = scorer.score(&candidate);
        let first = scores.iter().find(|(t, _)| *t == FieldType::FirstName).unwrap().1;
        let last = scores.iter().find(|(t, _)| *t == FieldType::LastName).unwrap().1;
        assert_eq!(first, last);
        let (winner, _) = scorer.best_match(&candidate).unwrap();
        assert_eq!(winner, FieldType::FirstName);
    }

    // -------------------------------------------------------------------------
    // Exclusions
    // -------------------------------------------------------------------------
    #[test]
    fn test_excluded_types_never_score() {
        let scorer = scorer();
        for ty in ["submit", "checkbox", "radio", "file", "hidden"] {
            let candidate = FieldCandidate {
                input_type: ty.to_string(),
                autocomplete: "email".to_string(),
                ..Default::default()
            };
            assert!(scorer.score(&candidate).is_empty(), "type={ty}");
            assert!(scorer.best_match(&candidate).is_none(), "type={ty}");
        }
    }

    #[test]
    fn test_disabled_and_hidden_never_score() {
        let scorer = scorer();
        let disabled = FieldCandidate {
            disabled: true,
            autocomplete: "email".to_string(),
            ..Default::default()
        };
        assert!(scorer.best_match(&disabled).is_none());

        let unrendered = FieldCandidate {
            rendered: false,
            autocomplete: "email".to_string(),
            ..Default::default()
        };
        assert!(scorer.best_match(&unrendered).is_none());
    }

    #[test]
    fn test_unmatched_candidate_has_no_best_match() {
        let scorer = scorer();
        let candidate = FieldCandidate {
            name: "favorite_color".to_string(),
            label: "Favorite color".to_string(),
            ..Default::default()
        };
        assert!(scorer.best_match(&candidate).is_none());
    }

    #[test]
    fn test_linkedin_matches_by_name_not_autocomplete() {
        let scorer = scorer();
        let candidate = FieldCandidate {
            name: "linkedin_profile".to_string(),
            label: "LinkedIn".to_string(),
            ..Default::default()
        };
        let (field_type, score) = scorer.best_match(&candidate).unwrap();
        assert_eq!(field_type, FieldType::LinkedinUrl);
        let config = scorer.config();
        assert_eq!(score, config.name_weight + config.label_weight);
    }

    // -------------------------------------------------------------------------
    // Purity: scoring twice yields identical results
    // -------------------------------------------------------------------------
    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = scorer();
        let candidate = FieldCandidate {
            name: "email".to_string(),
            label: "Email address".to_string(),
            ..Default::default()
        };
        assert_eq!(scorer.score(&candidate), scorer.score(&candidate));
    }
}
