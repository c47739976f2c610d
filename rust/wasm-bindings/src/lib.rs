// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-View WebAssembly Bindings
//!
//! JavaScript/TypeScript API for loading IFC files into renderable meshes,
//! built with wasm-bindgen on top of the host page's web-ifc engine.

use wasm_bindgen::prelude::*;

mod api;
mod engine;
mod file;
mod utils;

pub use api::{MeshUnitJs, ModelJs, ViewerAPI};
pub use engine::{IfcApi, WebIfcEngine, WebIfcGeometry, WebIfcLoader};
pub use file::BrowserFile;
pub use utils::set_panic_hook as init_panic_hook;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    utils::set_panic_hook();
}

/// Get the version of IFC-View
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
