//! Message contract with the surrounding extension runtime.
//!
//! Inbound requests arrive as `{type: "...", ...}` objects from the popup or
//! background script; outbound reports are fire-and-forget. All handlers
//! resolve, never reject; an unrecognized type resolves to undefined, and a
//! missing runtime channel (restricted page, extension not ready) is
//! swallowed rather than retried.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::autofill::types::AutofillProfile;

// =============================================================================
// Inbound requests
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "GET_DETECTION")]
    GetDetection,
    #[serde(rename = "SCAN_FIELDS")]
    ScanFields,
    #[serde(rename = "AUTOFILL_FORM")]
    AutofillForm { profile: AutofillProfile },
    #[serde(rename = "GET_TEXT")]
    GetText,
    /// Anything else resolves to undefined.
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanFieldsResponse {
    pub fillable_field_count: usize,
    pub has_application_form: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutofillFormResponse {
    pub filled_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetTextResponse {
    pub text: String,
}

// =============================================================================
// Outbound fire-and-forget reports (content -> background)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "DETECTION_RESULT", rename_all = "camelCase")]
    DetectionResult {
        is_job_page: bool,
        score: f64,
        signals: Vec<String>,
        url: String,
    },
    #[serde(rename = "FORM_DETECTION_UPDATE", rename_all = "camelCase")]
    FormDetectionUpdate {
        has_application_form: bool,
        fillable_field_count: usize,
    },
}

// =============================================================================
// Runtime bridge
// =============================================================================

#[wasm_bindgen(module = "/js/runtime-bridge.js")]
extern "C" {
    /// Forwarded to `browser.runtime.sendMessage` by the JS loader.
    /// Rejects when no extension context is attached to this page.
    #[wasm_bindgen(js_name = "sendRuntimeMessage", catch)]
    async fn send_runtime_message(message: JsValue) -> Result<JsValue, JsValue>;
}

/// Send a fire-and-forget report. Channel failures are logged and dropped;
/// page-side state stays authoritative and simply goes unreported this cycle.
pub fn post_message(message: &OutboundMessage) {
    let value = match serde_wasm_bindgen::to_value(message) {
        Ok(value) => value,
        Err(_) => return,
    };
    wasm_bindgen_futures::spawn_local(async move {
        if send_runtime_message(value).await.is_err() {
            web_sys::console::debug_1(
                &"[ContentScript] runtime channel unavailable, report dropped".into(),
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_messages_parse_by_type_tag() {
        let msg: InboundMessage = serde_json::from_str(r#"{"type":"GET_DETECTION"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::GetDetection));

        let msg: InboundMessage = serde_json::from_str(r#"{"type":"SCAN_FIELDS"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::ScanFields));
    }

    #[test]
    fn test_autofill_message_carries_profile() {
        let raw = r#"{"type":"AUTOFILL_FORM","profile":{"first_name":"Jane","email":"j@x.com"}}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        match msg {
            InboundMessage::AutofillForm { profile } => {
                assert_eq!(profile.first_name.as_deref(), Some("Jane"));
                assert_eq!(profile.last_name, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_type_maps_to_unknown() {
        let msg: InboundMessage = serde_json::from_str(r#"{"type":"SAVE_JOB"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::Unknown));
    }

    #[test]
    fn test_outbound_detection_result_wire_format() {
        let msg = OutboundMessage::DetectionResult {
            is_job_page: true,
            score: 85.0,
            signals: vec!["title_keyword".to_string()],
            url: "https://acme.example.com/careers".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"DETECTION_RESULT""#));
        assert!(json.contains(r#""isJobPage":true"#));
        assert!(json.contains(r#""signals":["title_keyword"]"#));
    }

    #[test]
    fn test_outbound_form_update_wire_format() {
        let msg = OutboundMessage::FormDetectionUpdate {
            has_application_form: true,
            fillable_field_count: 4,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"FORM_DETECTION_UPDATE""#));
        assert!(json.contains(r#""hasApplicationForm":true"#));
        assert!(json.contains(r#""fillableFieldCount":4"#));
    }

    #[test]
    fn test_scan_fields_response_is_camel_case() {
        let response = ScanFieldsResponse {
            fillable_field_count: 2,
            has_application_form: false,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"fillableFieldCount":2,"hasApplicationForm":false}"#
        );
    }
}
