// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ifc_view_core::ViewerError;
use wasm_bindgen::{JsCast, JsValue};

/// Set panic hook for better error messages in the browser
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Convert a pipeline error into a plain `{ code, message, kind, recoverable, context }` object
pub fn error_to_js(err: &ViewerError) -> JsValue {
    serde_wasm_bindgen::to_value(&err.report())
        .unwrap_or_else(|_| JsValue::from_str(&err.to_string()))
}

/// Render an opaque JS exception for inclusion in a Rust error message
pub fn describe_js_error(value: &JsValue) -> String {
    if let Some(message) = value.as_string() {
        return message;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}

pub fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
