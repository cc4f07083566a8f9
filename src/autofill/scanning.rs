//! Form scanner: enumerates page candidates and judges the page.
//!
//! Split in two halves. The pure half ([`classify`]) partitions an already
//! captured candidate slice into fillable and seen-but-unmatched, and applies
//! the form-density rule. The DOM half ([`snapshot_document`]) walks one
//! synchronous snapshot of the live document and turns each surviving element
//! into a [`FieldCandidate`] paired with its handle.
//!
//! The whole pass is synchronous over one snapshot, so a page script cannot
//! mutate the DOM mid-scan and produce a torn read.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlLabelElement, HtmlTextAreaElement};

use crate::autofill::scoring::FieldScorer;
use crate::autofill::types::{CandidateTag, ClassifiedField, ClassifiedScan, FieldCandidate};

// =============================================================================
// Pure classification
// =============================================================================

/// Classify a candidate slice. Indexes in the result refer to the input slice.
///
/// A page counts as an application form only when at least one field is
/// fillable and the candidate density crosses `min_form_fields`: one stray
/// email input outside form context must not register.
pub fn classify(scorer: &FieldScorer, candidates: &[FieldCandidate]) -> ClassifiedScan {
    let mut fillable = Vec::new();
    let mut total_relevant = 0usize;

    for (index, candidate) in candidates.iter().enumerate() {
        if !candidate.is_candidate() {
            continue;
        }
        total_relevant += 1;

        if !candidate.is_writable() {
            continue;
        }
        if let Some((field_type, score)) = scorer.best_match(candidate) {
            if score >= scorer.config().accept_threshold {
                fillable.push(ClassifiedField {
                    index,
                    field_type,
                    score,
                });
            }
        }
    }

    let has_application_form =
        !fillable.is_empty() && total_relevant >= scorer.config().min_form_fields;

    ClassifiedScan {
        fillable,
        total_relevant,
        has_application_form,
    }
}

// =============================================================================
// DOM snapshot
// =============================================================================

/// Capture every input/textarea in the document as a scoring candidate,
/// paired with its live handle. Elements that fail extraction are skipped
/// individually so one bad element cannot abort the scan.
pub fn snapshot_document(document: &Document) -> Vec<(HtmlElement, FieldCandidate)> {
    let list = match document.query_selector_all("input, textarea") {
        Ok(list) => list,
        Err(_) => return Vec::new(),
    };

    let mut out = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        let Some(node) = list.get(i) else { continue };
        let Some(element) = node.dyn_ref::<Element>() else { continue };
        if let Some(pair) = capture_candidate(document, element) {
            out.push(pair);
        }
    }
    out
}

fn capture_candidate(
    document: &Document,
    element: &Element,
) -> Option<(HtmlElement, FieldCandidate)> {
    let html: &HtmlElement = element.dyn_ref()?;
    let rendered = html.offset_width() > 0 || html.offset_height() > 0;
    let label = resolve_label(document, element);

    let candidate = if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        FieldCandidate {
            tag: CandidateTag::Input,
            input_type: input.type_().to_ascii_lowercase(),
            autocomplete: input.autocomplete(),
            id: input.id(),
            name: input.name(),
            placeholder: input.placeholder(),
            label,
            disabled: input.disabled(),
            read_only: input.read_only(),
            rendered,
        }
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        FieldCandidate {
            tag: CandidateTag::Textarea,
            input_type: String::new(),
            autocomplete: element.get_attribute("autocomplete").unwrap_or_default(),
            id: area.id(),
            name: area.name(),
            placeholder: area.placeholder(),
            label,
            disabled: area.disabled(),
            read_only: area.read_only(),
            rendered,
        }
    } else {
        return None;
    };

    Some((html.clone(), candidate))
}

/// Resolve the text a user would read as this element's label.
///
/// Precedence: aria-label, aria-labelledby targets, `<label for=...>`,
/// a wrapping `<label>`, then short preceding-sibling text as a last resort.
fn resolve_label(document: &Document, element: &Element) -> String {
    if let Some(aria) = element.get_attribute("aria-label") {
        if !aria.trim().is_empty() {
            return aria.trim().to_string();
        }
    }

    if let Some(labelled_by) = element.get_attribute("aria-labelledby") {
        let mut parts = Vec::new();
        for id in labelled_by.split_whitespace() {
            if let Some(target) = document.get_element_by_id(id) {
                if let Some(text) = target.text_content() {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        parts.push(text);
                    }
                }
            }
        }
        if !parts.is_empty() {
            return parts.join(" ");
        }
    }

    let id = element.id();
    if !id.is_empty() {
        let labels = document.get_elements_by_tag_name("label");
        for i in 0..labels.length() {
            let Some(node) = labels.item(i) else { continue };
            let Some(label) = node.dyn_ref::<HtmlLabelElement>() else { continue };
            if label.html_for() == id {
                if let Some(text) = label.text_content() {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
        }
    }

    if let Ok(Some(wrapper)) = element.closest("label") {
        if let Some(text) = wrapper.text_content() {
            let text = text.trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }
    }

    // Heuristic fallback: short text immediately before the element.
    if let Some(sibling) = element.previous_element_sibling() {
        if let Some(text) = sibling.text_content() {
            let text = text.trim().to_string();
            if !text.is_empty() && text.len() <= 80 {
                return text;
            }
        }
    }

    String::new()
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use crate::autofill::engine::AutofillEngine;
    use crate::autofill::types::FieldType;
    use wasm_bindgen_test::*;
    use web_sys::Document;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn mount(html: &str) -> web_sys::Element {
        let doc = document();
        let root = doc.create_element("div").unwrap();
        root.set_inner_html(html);
        doc.body().unwrap().append_child(&root).unwrap();
        root
    }

    fn captured(name: &str) -> FieldCandidate {
        snapshot_document(&document())
            .into_iter()
            .map(|(_, candidate)| candidate)
            .find(|candidate| candidate.name == name)
            .expect("element was not captured")
    }

    // -------------------------------------------------------------------------
    // Label resolution precedence
    // -------------------------------------------------------------------------
    #[wasm_bindgen_test]
    fn wasm_aria_label_beats_every_other_source() {
        let root = mount(
            r#"<label for="al1">Wrong label</label>
               <input id="al1" name="al" aria-label="First name" placeholder="also wrong">"#,
        );
        assert_eq!(captured("al").label, "First name");
        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_aria_labelledby_joins_all_targets() {
        let root = mount(
            r#"<span id="lb1">Email</span><span id="lb2">address</span>
               <input name="lb" aria-labelledby="lb1 lb2">"#,
        );
        assert_eq!(captured("lb").label, "Email address");
        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_label_for_attribute_is_resolved() {
        let root = mount(r#"<label for="lf1">Email</label><input id="lf1" name="lf">"#);
        assert_eq!(captured("lf").label, "Email");
        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_wrapping_label_is_resolved() {
        let root = mount(r#"<label>Phone <input name="wl"></label>"#);
        assert_eq!(captured("wl").label, "Phone");
        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_short_preceding_sibling_text_is_the_fallback() {
        let root = mount(r#"<span>Last name</span><input name="ps">"#);
        assert_eq!(captured("ps").label, "Last name");
        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_unlabelled_input_resolves_to_empty() {
        let root = mount(r#"<div><input name="nl"></div>"#);
        assert_eq!(captured("nl").label, "");
        root.remove();
    }

    // -------------------------------------------------------------------------
    // Snapshot attribute capture and rendering filter
    // -------------------------------------------------------------------------
    #[wasm_bindgen_test]
    fn wasm_snapshot_captures_scoring_attributes() {
        let root = mount(
            r#"<input type="Email" name="sa" id="sa-id" autocomplete="email" placeholder="you@example.com">"#,
        );
        let candidate = captured("sa");
        assert_eq!(candidate.tag, CandidateTag::Input);
        assert_eq!(candidate.input_type, "email");
        assert_eq!(candidate.autocomplete, "email");
        assert_eq!(candidate.id, "sa-id");
        assert_eq!(candidate.placeholder, "you@example.com");
        assert!(candidate.rendered);
        assert!(!candidate.disabled);
        assert!(!candidate.read_only);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_snapshot_captures_textareas() {
        let root = mount(r#"<textarea name="ta" placeholder="Cover letter"></textarea>"#);
        let candidate = captured("ta");
        assert_eq!(candidate.tag, CandidateTag::Textarea);
        assert_eq!(candidate.placeholder, "Cover letter");
        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_display_none_input_is_captured_as_unrendered() {
        let root = mount(
            r#"<input name="hid" style="display:none"><input name="vis">"#,
        );
        assert!(!captured("hid").rendered);
        assert!(captured("vis").rendered);
        root.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_disabled_and_readonly_flags_are_captured() {
        let root = mount(r#"<input name="dis" disabled><input name="ro" readonly>"#);
        assert!(captured("dis").disabled);
        assert!(captured("ro").read_only);
        root.remove();
    }

    // -------------------------------------------------------------------------
    // Engine over a real document
    // -------------------------------------------------------------------------
    #[wasm_bindgen_test]
    fn wasm_engine_scan_is_idempotent_on_unchanged_dom() {
        let root = mount(
            r#"<input name="first_name"><input name="last_name">
               <input name="email"><input name="phone">"#,
        );
        let doc = document();
        let mut engine = AutofillEngine::new();

        let first: Vec<(FieldType, f64)> = engine
            .scan(&doc)
            .fillable_fields
            .iter()
            .map(|f| (f.field_type, f.score))
            .collect();
        let (has_form, total) = {
            let scan = engine.last_scan_result().unwrap();
            (scan.has_application_form, scan.total_relevant_fields)
        };

        let second: Vec<(FieldType, f64)> = engine
            .scan(&doc)
            .fillable_fields
            .iter()
            .map(|f| (f.field_type, f.score))
            .collect();
        let rescan = engine.last_scan_result().unwrap();

        assert_eq!(first, second);
        assert_eq!(has_form, rescan.has_application_form);
        assert_eq!(total, rescan.total_relevant_fields);
        assert!(has_form);
        assert_eq!(total, 4);
        root.remove();
    }
}
