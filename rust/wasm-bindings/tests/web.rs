// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Browser tests; run with `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use ifc_view_wasm::{version, IfcApi, ViewerAPI};
use js_sys::{Object, Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn viewer() -> ViewerAPI {
    // No engine method runs before setup, so a bare object stands in for IfcAPI
    ViewerAPI::new(JsValue::from(Object::new()).unchecked_into::<IfcApi>())
}

fn field(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_version_matches_package() {
    assert_eq!(version(), env!("CARGO_PKG_VERSION"));
}

#[wasm_bindgen_test]
fn test_fresh_viewer_state() {
    let api = viewer();
    assert!(!api.is_initialized());
    assert!(!api.is_loading());
}

#[wasm_bindgen_test]
async fn test_load_before_init_rejects_with_code() {
    let api = viewer();
    let bytes = Uint8Array::from(&b"ISO-10303-21;"[..]);
    let err = JsFuture::from(api.load_bytes("tower.ifc".into(), bytes, None))
        .await
        .unwrap_err();

    assert_eq!(field(&err, "code").as_string().unwrap(), "NOT_INITIALIZED");
    assert_eq!(field(&err, "recoverable"), JsValue::TRUE);
    let context = field(&err, "context");
    assert_eq!(field(&context, "fileName").as_string().unwrap(), "tower.ifc");
}

#[wasm_bindgen_test]
async fn test_malformed_config_rejects_with_code() {
    let api = viewer();
    let config = Object::new();
    Reflect::set(&config, &"useRemote".into(), &"yes".into()).unwrap();
    let err = JsFuture::from(api.init(config.into())).await.unwrap_err();

    assert_eq!(field(&err, "code").as_string().unwrap(), "INVALID_CONFIG");
    assert_eq!(field(&err, "kind").as_string().unwrap(), "setup");
    assert_eq!(field(&err, "recoverable"), JsValue::TRUE);
    assert!(!api.is_initialized());
}

#[wasm_bindgen_test]
async fn test_setup_failure_is_not_recoverable() {
    // Init is missing on the stand-in, so the engine bootstrap throws
    let api = viewer();
    let err = JsFuture::from(api.init(JsValue::UNDEFINED)).await.unwrap_err();

    assert_eq!(field(&err, "code").as_string().unwrap(), "SETUP_FAILED");
    assert_eq!(field(&err, "recoverable"), JsValue::FALSE);
    assert!(!api.is_initialized());
}
