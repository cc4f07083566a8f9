//! Native value filler: writes a value so controlling frameworks notice.
//!
//! Frameworks that mirror input state (React-style controlled components)
//! intercept plain value assignment and silently discard external writes.
//! The reliable path is: invoke the platform prototype setter directly,
//! bypassing any per-instance override, then dispatch the standard `input`
//! and `change` events so the framework re-reads the DOM. A post-dispatch
//! verification catches frameworks that revert uncontrolled writes.
//!
//! Never focuses, scrolls, or highlights. All failures degrade to `false`.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventInit, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

/// Fill one element with a value, returning true only if the write stuck.
///
/// Read-only and disabled elements are skipped (returns false, not an error).
pub fn fill_field(element: &HtmlElement, value: &str) -> bool {
    if !is_writable(element) {
        return false;
    }
    if set_native_value(element, value).is_err() {
        return false;
    }
    if dispatch_change_events(element).is_err() {
        return false;
    }
    // Some frameworks revert writes they do not control. Only a verified
    // write counts as filled.
    current_value(element).as_deref() == Some(value)
}

/// Invoke the platform-level prototype value setter for the element's tag,
/// bypassing any per-instance override the hosting framework installed.
pub fn set_native_value(element: &HtmlElement, value: &str) -> Result<(), JsValue> {
    let ctor_name = if element.dyn_ref::<HtmlTextAreaElement>().is_some() {
        "HTMLTextAreaElement"
    } else {
        "HTMLInputElement"
    };

    let global = js_sys::global();
    let ctor = js_sys::Reflect::get(&global, &JsValue::from_str(ctor_name))?;
    let prototype = js_sys::Reflect::get(&ctor, &JsValue::from_str("prototype"))?;
    let prototype: js_sys::Object = prototype
        .dyn_into()
        .map_err(|_| JsValue::from_str("missing element prototype"))?;

    let descriptor =
        js_sys::Object::get_own_property_descriptor(&prototype, &JsValue::from_str("value"));
    let setter = js_sys::Reflect::get(&descriptor, &JsValue::from_str("set"))?;
    let setter: js_sys::Function = setter
        .dyn_into()
        .map_err(|_| JsValue::from_str("value setter is not callable"))?;

    setter.call1(element, &JsValue::from_str(value))?;
    Ok(())
}

/// Dispatch bubbling `input` and `change` events so listening frameworks
/// re-render their controlled state from the DOM.
fn dispatch_change_events(element: &HtmlElement) -> Result<(), JsValue> {
    for event_type in ["input", "change"] {
        let init = EventInit::new();
        init.set_bubbles(true);
        let event = Event::new_with_event_init_dict(event_type, &init)?;
        element.dispatch_event(&event)?;
    }
    Ok(())
}

fn is_writable(element: &HtmlElement) -> bool {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return !input.disabled() && !input.read_only();
    }
    if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        return !area.disabled() && !area.read_only();
    }
    false
}

fn current_value(element: &HtmlElement) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        return Some(area.value());
    }
    None
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn test_input() -> HtmlInputElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let element = document.create_element("input").unwrap();
        let input: HtmlInputElement = element.dyn_into().unwrap();
        document.body().unwrap().append_child(&input).unwrap();
        input
    }

    #[wasm_bindgen_test]
    fn wasm_fill_plain_input_sets_value_and_verifies() {
        let input = test_input();
        assert!(fill_field(&input, "Jane"));
        assert_eq!(input.value(), "Jane");
        input.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_fill_readonly_input_is_skipped() {
        let input = test_input();
        input.set_read_only(true);
        assert!(!fill_field(&input, "Jane"));
        assert_eq!(input.value(), "");
        input.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_fill_reports_false_when_listener_reverts_value() {
        let input = test_input();
        let target = input.clone();
        let revert = Closure::<dyn FnMut()>::new(move || {
            target.set_value("");
        });
        input
            .add_event_listener_with_callback("input", revert.as_ref().unchecked_ref())
            .unwrap();
        assert!(!fill_field(&input, "Jane"));
        drop(revert);
        input.remove();
    }

    #[wasm_bindgen_test]
    fn wasm_fill_dispatches_input_event() {
        let input = test_input();
        let seen = std::rc::Rc::new(std::cell::Cell::new(false));
        let seen_in_listener = seen.clone();
        let listener = Closure::<dyn FnMut()>::new(move || {
            seen_in_listener.set(true);
        });
        input
            .add_event_listener_with_callback("input", listener.as_ref().unchecked_ref())
            .unwrap();
        assert!(fill_field(&input, "j@x.com"));
        assert!(seen.get());
        drop(listener);
        input.remove();
    }
}
