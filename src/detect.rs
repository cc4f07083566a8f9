//! Job-page detector: scores a page's likelihood of being a job listing.
//!
//! Same scoring philosophy as the autofill scorer, independent of it:
//! weighted hits over title, headings, URL shape, and body vocabulary are
//! summed into a score compared against a threshold. Body vocabulary is
//! matched with an Aho-Corasick automaton built once at construction.
//! Pure function of the captured page snapshot; no network, no DOM writes.

use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::{Deserialize, Serialize};
use web_sys::Document;

// =============================================================================
// Types
// =============================================================================

/// Everything the detector reads from a page, captured in one pass.
/// Construct directly in tests; [`PageSnapshot::capture`] reads the live DOM.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub headings: Vec<String>,
    pub body_text: String,
}

impl PageSnapshot {
    /// Capture the current document. Missing pieces degrade to empty strings.
    pub fn capture(document: &Document) -> Self {
        let url = document
            .location()
            .and_then(|loc| loc.href().ok())
            .unwrap_or_default();

        let mut headings = Vec::new();
        if let Ok(list) = document.query_selector_all("h1, h2, h3") {
            for i in 0..list.length() {
                let Some(node) = list.get(i) else { continue };
                if let Some(text) = node.text_content() {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        headings.push(text);
                    }
                }
            }
        }

        let body_text = document
            .body()
            .map(|body| body.inner_text())
            .unwrap_or_default();

        Self {
            url,
            title: document.title(),
            headings,
            body_text,
        }
    }
}

/// Detection outcome. `signals` lists fired signal names in catalog order,
/// for observability only; decisions use the score alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub is_job_page: bool,
    pub score: f64,
    pub signals: Vec<String>,
}

/// Tunable detector weights. Defaults are the shipped values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub title_weight: f64,
    pub url_weight: f64,
    pub ats_weight: f64,
    pub heading_weight: f64,
    /// Score per distinct vocabulary term found in body text.
    pub vocabulary_term_weight: f64,
    /// Cap on the total vocabulary contribution.
    pub vocabulary_cap: f64,
    /// Distinct terms required before the vocabulary signal fires.
    pub vocabulary_min_terms: usize,
    pub salary_weight: f64,
    pub apply_weight: f64,
    pub threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            title_weight: 25.0,
            url_weight: 20.0,
            ats_weight: 40.0,
            heading_weight: 15.0,
            vocabulary_term_weight: 5.0,
            vocabulary_cap: 30.0,
            vocabulary_min_terms: 2,
            salary_weight: 15.0,
            apply_weight: 10.0,
            threshold: 60.0,
        }
    }
}

// =============================================================================
// Signal catalogs
// =============================================================================

/// Hostnames of known applicant-tracking systems.
const ATS_FINGERPRINTS: [&str; 11] = [
    "greenhouse.io",
    "lever.co",
    "myworkdayjobs.com",
    "ashbyhq.com",
    "icims.com",
    "taleo.net",
    "smartrecruiters.com",
    "jobvite.com",
    "bamboohr.com",
    "workable.com",
    "recruitee.com",
];

/// Job-posting vocabulary scanned in body text, distinct-term counted.
const BODY_VOCABULARY: [&str; 15] = [
    "responsibilities",
    "qualifications",
    "requirements",
    "equal opportunity employer",
    "job description",
    "what you'll do",
    "what you will do",
    "about the role",
    "we are looking for",
    "years of experience",
    "benefits",
    "full-time",
    "part-time",
    "compensation",
    "salary",
];

// =============================================================================
// Detector
// =============================================================================

/// Scored-signal job listing classifier.
pub struct JobPageDetector {
    config: DetectorConfig,
    vocabulary: AhoCorasick,
    title_re: Regex,
    url_re: Regex,
    heading_re: Regex,
    salary_re: Regex,
    apply_re: Regex,
}

impl JobPageDetector {
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        // Static catalogs; failures here are programming errors.
        let vocabulary = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(BODY_VOCABULARY)
            .unwrap();
        let title_re =
            Regex::new(r"(?i)\b(jobs?|careers?|hiring|position|opening|vacanc(y|ies))\b").unwrap();
        let url_re =
            Regex::new(r"(?i)/(jobs?|careers?|positions?|apply|vacanc|openings?|recruit)").unwrap();
        let heading_re = Regex::new(
            r"(?i)responsibilit|qualification|requirement|about (the|this) role|what you.ll do|benefits",
        )
        .unwrap();
        let salary_re = Regex::new(
            r"(?i)\$\s*\d[\d,]*(\.\d+)?\s*k?\s*(-|–|—|to)\s*\$?\s*\d[\d,]*(\.\d+)?\s*k?|salary range|compensation range|pay range",
        )
        .unwrap();
        let apply_re =
            Regex::new(r"(?i)apply (now|today|for this (job|position|role))|submit (your )?application")
                .unwrap();

        Self {
            config,
            vocabulary,
            title_re,
            url_re,
            heading_re,
            salary_re,
            apply_re,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Score one snapshot. Signals are evaluated and reported in a fixed
    /// catalog order regardless of where they appear on the page.
    pub fn detect(&self, page: &PageSnapshot) -> DetectionResult {
        let mut score = 0.0;
        let mut signals = Vec::new();

        if self.title_re.is_match(&page.title) {
            score += self.config.title_weight;
            signals.push("title_keyword".to_string());
        }

        if self.url_re.is_match(&page.url) {
            score += self.config.url_weight;
            signals.push("url_job_path".to_string());
        }

        let url_lower = page.url.to_ascii_lowercase();
        if ATS_FINGERPRINTS.iter().any(|host| url_lower.contains(host)) {
            score += self.config.ats_weight;
            signals.push("ats_fingerprint".to_string());
        }

        if page.headings.iter().any(|h| self.heading_re.is_match(h)) {
            score += self.config.heading_weight;
            signals.push("heading_keyword".to_string());
        }

        let distinct_terms = self.distinct_vocabulary_terms(&page.body_text);
        if distinct_terms >= self.config.vocabulary_min_terms {
            let contribution = (distinct_terms as f64 * self.config.vocabulary_term_weight)
                .min(self.config.vocabulary_cap);
            score += contribution;
            signals.push("body_vocabulary".to_string());
        }

        if self.salary_re.is_match(&page.body_text) {
            score += self.config.salary_weight;
            signals.push("salary_range".to_string());
        }

        if self.apply_re.is_match(&page.body_text) {
            score += self.config.apply_weight;
            signals.push("apply_action".to_string());
        }

        DetectionResult {
            is_job_page: score >= self.config.threshold,
            score,
            signals,
        }
    }

    fn distinct_vocabulary_terms(&self, text: &str) -> usize {
        let mut seen = [false; BODY_VOCABULARY.len()];
        for hit in self.vocabulary.find_iter(text) {
            seen[hit.pattern().as_usize()] = true;
        }
        seen.iter().filter(|s| **s).count()
    }
}

impl Default for JobPageDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_capture_reads_title_headings_url_and_body() {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        document.set_title("Careers at Acme");

        let root = document.create_element("div").unwrap();
        root.set_inner_html(
            "<h2>Responsibilities</h2><p>We are looking for an engineer. Apply now!</p>",
        );
        document.body().unwrap().append_child(&root).unwrap();

        let snapshot = PageSnapshot::capture(&document);
        assert_eq!(snapshot.title, "Careers at Acme");
        assert!(snapshot
            .headings
            .iter()
            .any(|heading| heading == "Responsibilities"));
        assert!(snapshot.body_text.contains("We are looking for an engineer."));
        assert!(!snapshot.url.is_empty());

        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_captured_page_flows_into_the_detector() {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        document.set_title("Senior Rust Engineer - Careers at Acme");

        let root = document.create_element("div").unwrap();
        root.set_inner_html(
            "<h2>Qualifications</h2>\
             <p>Responsibilities and qualifications below. \
             Salary range $140,000 - $180,000. Apply now!</p>",
        );
        document.body().unwrap().append_child(&root).unwrap();

        let result = JobPageDetector::new().detect(&PageSnapshot::capture(&document));
        assert!(result.signals.contains(&"title_keyword".to_string()));
        assert!(result.signals.contains(&"heading_keyword".to_string()));
        assert!(result.signals.contains(&"salary_range".to_string()));

        root.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_listing() -> PageSnapshot {
        PageSnapshot {
            url: "https://acme.example.com/careers/senior-rust-engineer".to_string(),
            title: "Senior Rust Engineer - Careers at Acme".to_string(),
            headings: vec![
                "Senior Rust Engineer".to_string(),
                "Responsibilities".to_string(),
                "Qualifications".to_string(),
            ],
            body_text: "We are looking for an engineer. Responsibilities include systems work. \
                        Qualifications: 5 years of experience. Benefits: health, dental. \
                        Salary range $140,000 - $180,000. Apply now!"
                .to_string(),
        }
    }

    #[test]
    fn test_job_listing_is_detected() {
        let detector = JobPageDetector::new();
        let result = detector.detect(&job_listing());
        assert!(result.is_job_page);
        assert!(result.score >= detector.config().threshold);
    }

    #[test]
    fn test_signals_fire_in_catalog_order() {
        let detector = JobPageDetector::new();
        let result = detector.detect(&job_listing());
        assert_eq!(
            result.signals,
            vec![
                "title_keyword",
                "url_job_path",
                "heading_keyword",
                "body_vocabulary",
                "salary_range",
                "apply_action",
            ]
        );
    }

    #[test]
    fn test_unrelated_page_scores_zero() {
        let detector = JobPageDetector::new();
        let result = detector.detect(&PageSnapshot {
            url: "https://example.com/blog/rust-tips".to_string(),
            title: "Ten Rust Tips".to_string(),
            headings: vec!["Introduction".to_string()],
            body_text: "Here are some tips about the borrow checker.".to_string(),
        });
        assert!(!result.is_job_page);
        assert_eq!(result.score, 0.0);
        assert!(result.signals.is_empty());
    }

    #[test]
    fn test_ats_fingerprint_alone_is_not_enough() {
        let detector = JobPageDetector::new();
        let result = detector.detect(&PageSnapshot {
            url: "https://app.lever.co/acme/1234".to_string(),
            ..Default::default()
        });
        assert_eq!(result.signals, vec!["ats_fingerprint"]);
        assert!(!result.is_job_page);
    }

    #[test]
    fn test_ats_page_with_vocabulary_is_detected() {
        let detector = JobPageDetector::new();
        let result = detector.detect(&PageSnapshot {
            url: "https://boards.greenhouse.io/acme/jobs/99".to_string(),
            body_text: "Responsibilities and qualifications are listed below.".to_string(),
            ..Default::default()
        });
        // ats (40) + url (20) + vocabulary (10) crosses the threshold.
        assert!(result.is_job_page);
        assert!(result.signals.contains(&"ats_fingerprint".to_string()));
    }

    #[test]
    fn test_vocabulary_counts_distinct_terms_not_repeats() {
        let detector = JobPageDetector::new();
        let repeated = PageSnapshot {
            body_text: "benefits benefits benefits benefits".to_string(),
            ..Default::default()
        };
        // One distinct term is below vocabulary_min_terms.
        let result = detector.detect(&repeated);
        assert!(!result.signals.contains(&"body_vocabulary".to_string()));

        let distinct = PageSnapshot {
            body_text: "benefits and qualifications".to_string(),
            ..Default::default()
        };
        let result = detector.detect(&distinct);
        assert!(result.signals.contains(&"body_vocabulary".to_string()));
        assert_eq!(result.score, 2.0 * detector.config().vocabulary_term_weight);
    }

    #[test]
    fn test_vocabulary_contribution_is_capped() {
        let detector = JobPageDetector::new();
        let everything = PageSnapshot {
            body_text: BODY_VOCABULARY.join(" "),
            ..Default::default()
        };
        let result = detector.detect(&everything);
        assert_eq!(result.score, detector.config().vocabulary_cap);
    }

    #[test]
    fn test_salary_range_patterns() {
        let detector = JobPageDetector::new();
        for text in [
            "$120,000 - $150,000 per year",
            "$90k-$120k",
            "Salary Range: competitive",
            "$80,000 to $95,000",
        ] {
            let result = detector.detect(&PageSnapshot {
                body_text: text.to_string(),
                ..Default::default()
            });
            assert!(
                result.signals.contains(&"salary_range".to_string()),
                "expected salary signal for {text:?}"
            );
        }
    }

    #[test]
    fn test_detection_is_deterministic() {
        let detector = JobPageDetector::new();
        let page = job_listing();
        assert_eq!(detector.detect(&page), detector.detect(&page));
    }
}
