//! Single-shot, cancel-on-supersede delayed tasks.
//!
//! One abstraction for both suspension points the content script has: the
//! retry timer and the mutation-debounce timer. Scheduling cancels any
//! pending shot first, which is exactly the debounce coalescing rule.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

/// A cancellable one-shot timer. Dropping it cancels the pending shot.
pub struct DelayedTask {
    handle: Option<i32>,
    // The closure must outlive the timeout; dropping it early would leave
    // the browser holding a dangling callback.
    callback: Option<Closure<dyn FnMut()>>,
}

impl DelayedTask {
    pub fn new() -> Self {
        Self {
            handle: None,
            callback: None,
        }
    }

    /// Schedule `task` to run once after `delay_ms`, superseding any
    /// previously pending shot.
    pub fn schedule(
        &mut self,
        delay_ms: i32,
        task: impl FnMut() + 'static,
    ) -> Result<(), JsValue> {
        self.cancel();

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let callback = Closure::wrap(Box::new(task) as Box<dyn FnMut()>);
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay_ms,
        )?;

        self.handle = Some(handle);
        self.callback = Some(callback);
        Ok(())
    }

    /// Cancel the pending shot, if any. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
        self.callback = None;
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }
}

impl Default for DelayedTask {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DelayedTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn wasm_schedule_marks_pending_and_cancel_clears_it() {
        let mut task = DelayedTask::new();
        assert!(!task.is_pending());
        task.schedule(10_000, || {}).unwrap();
        assert!(task.is_pending());
        task.cancel();
        assert!(!task.is_pending());
    }

    #[wasm_bindgen_test]
    async fn wasm_superseding_schedule_runs_only_the_second_task() {
        let fired = Rc::new(Cell::new(0u32));
        let mut task = DelayedTask::new();

        let first = fired.clone();
        task.schedule(5, move || first.set(first.get() + 10)).unwrap();
        let second = fired.clone();
        task.schedule(5, move || second.set(second.get() + 1)).unwrap();

        let sleep = js_sys::Promise::new(&mut |resolve, _| {
            web_sys::window()
                .unwrap()
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 50)
                .unwrap();
        });
        wasm_bindgen_futures::JsFuture::from(sleep).await.unwrap();

        assert_eq!(fired.get(), 1);
    }
}
