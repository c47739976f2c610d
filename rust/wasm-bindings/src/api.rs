// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JavaScript API for IFC-View
//!
//! Promise-based API wrapping the load pipeline. Errors reject with plain
//! objects carrying `code`, `message`, `kind`, `recoverable` and `context`.

use crate::engine::{IfcApi, WebIfcLoader};
use crate::file::BrowserFile;
use crate::utils::{console_log, console_warn, error_to_js};
use ifc_view_core::{DecoderConfig, ViewerError};
use ifc_view_geometry::MeshUnit;
use ifc_view_processing::{
    FileSource, InMemoryFile, Model, ModelLoader, ProgressEvent, ProgressSink,
};
use js_sys::{Array, Function, Promise, Uint8Array};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Entry point for the viewer: one decoder binding, one load at a time
#[wasm_bindgen]
pub struct ViewerAPI {
    loader: Rc<ModelLoader<WebIfcLoader>>,
}

#[wasm_bindgen]
impl ViewerAPI {
    /// Wrap a web-ifc `IfcAPI` instance
    #[wasm_bindgen(constructor)]
    pub fn new(ifc_api: IfcApi) -> ViewerAPI {
        ViewerAPI {
            loader: Rc::new(ModelLoader::new(WebIfcLoader::new(ifc_api))),
        }
    }

    /// Set up the decoder.
    ///
    /// `config` is optional: `{ localWasmPath?, remoteWasmUrl?, useRemote? }`.
    /// Resolves to `true`; repeated calls after success resolve immediately.
    pub fn init(&self, config: JsValue) -> Promise {
        let loader = Rc::clone(&self.loader);
        future_to_promise(async move {
            let config: DecoderConfig = if config.is_undefined() || config.is_null() {
                DecoderConfig::default()
            } else {
                serde_wasm_bindgen::from_value(config)
                    .map_err(|e| error_to_js(&ViewerError::invalid_config(e)))?
            };
            loader
                .initialize_with(&config)
                .await
                .map_err(|e| error_to_js(&e))?;
            Ok(JsValue::TRUE)
        })
    }

    #[wasm_bindgen(getter, js_name = isInitialized)]
    pub fn is_initialized(&self) -> bool {
        self.loader.is_initialized()
    }

    #[wasm_bindgen(getter, js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// Load a browser `File`; resolves to a `Model`
    ///
    /// `onProgress` receives `{ percent, message, stage }`.
    #[wasm_bindgen(js_name = loadFile)]
    pub fn load_file(&self, file: web_sys::File, on_progress: Option<Function>) -> Promise {
        let loader = Rc::clone(&self.loader);
        future_to_promise(async move {
            let source = BrowserFile::new(file);
            load_into_js(&loader, &source, on_progress).await
        })
    }

    /// Load bytes already in memory under a display name
    #[wasm_bindgen(js_name = loadBytes)]
    pub fn load_bytes(
        &self,
        name: String,
        data: Uint8Array,
        on_progress: Option<Function>,
    ) -> Promise {
        let loader = Rc::clone(&self.loader);
        let source = InMemoryFile::new(name, data.to_vec());
        future_to_promise(async move { load_into_js(&loader, &source, on_progress).await })
    }
}

async fn load_into_js<S: FileSource>(
    loader: &ModelLoader<WebIfcLoader>,
    source: &S,
    on_progress: Option<Function>,
) -> Result<JsValue, JsValue> {
    let mut sink = JsProgress { callback: on_progress };
    let model = loader.load(source, &mut sink).await.map_err(|e| error_to_js(&e))?;

    let meta = model.metadata();
    console_log(&format!(
        "[IFC-View] Loaded {}: {} meshes, {} triangles",
        meta.file_name, meta.mesh_count, meta.triangle_count
    ));
    Ok(ModelJs { model }.into())
}

/// Forwards progress to an optional JS callback
struct JsProgress {
    callback: Option<Function>,
}

impl ProgressSink for JsProgress {
    fn report(&mut self, event: &ProgressEvent) {
        let Some(callback) = &self.callback else {
            return;
        };
        let payload = match serde_wasm_bindgen::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                console_warn(&format!("[IFC-View] Dropped progress event: {}", e));
                return;
            }
        };
        if let Err(e) = callback.call1(&JsValue::NULL, &payload) {
            console_warn(&format!("[IFC-View] Progress callback threw: {:?}", e));
        }
    }
}

/// A loaded model. Only `metadata`, `id` and `isDisposed` stay usable after `dispose()`.
#[wasm_bindgen(js_name = Model)]
pub struct ModelJs {
    model: Model,
}

#[wasm_bindgen(js_class = Model)]
impl ModelJs {
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.model.id().to_string()
    }

    /// `{ id, fileName, fileSize, loadedAtMs, meshCount, vertexCount, triangleCount,
    /// bounds, stats }`
    #[wasm_bindgen(getter)]
    pub fn metadata(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.model.metadata()).map_err(JsValue::from)
    }

    #[wasm_bindgen(getter, js_name = meshCount)]
    pub fn mesh_count(&self) -> usize {
        self.model.metadata().mesh_count
    }

    #[wasm_bindgen(getter, js_name = isDisposed)]
    pub fn is_disposed(&self) -> bool {
        self.model.is_disposed()
    }

    /// Copy of the mesh at `index`, or `undefined` when out of range
    #[wasm_bindgen(js_name = getMesh)]
    pub fn get_mesh(&self, index: usize) -> Result<Option<MeshUnitJs>, JsValue> {
        let group = self.model.group().map_err(|e| error_to_js(&e))?;
        Ok(group.meshes().get(index).map(MeshUnitJs::from_unit))
    }

    /// Every mesh produced for one building element
    #[wasm_bindgen(js_name = meshesForOwner)]
    pub fn meshes_for_owner(&self, owner_id: u32) -> Result<Array, JsValue> {
        let group = self.model.group().map_err(|e| error_to_js(&e))?;
        Ok(group
            .meshes_for_owner(owner_id)
            .map(|unit| JsValue::from(MeshUnitJs::from_unit(unit)))
            .collect())
    }

    /// Original file bytes as Uint8Array (copy to JS)
    #[wasm_bindgen(getter, js_name = rawBytes)]
    pub fn raw_bytes(&self) -> Result<Uint8Array, JsValue> {
        let bytes = self.model.raw_bytes().map_err(|e| error_to_js(&e))?;
        Ok(Uint8Array::from(bytes))
    }

    /// Free mesh buffers and file bytes. Returns false when already disposed.
    pub fn dispose(&mut self) -> bool {
        self.model.dispose()
    }
}

/// Renderable mesh data handed to JavaScript
#[wasm_bindgen(js_name = MeshUnit)]
pub struct MeshUnitJs {
    owner_id: u32,
    part_id: u32,
    positions: Vec<f32>,
    normals: Vec<f32>,
    indices: Vec<u32>,
    color: [f32; 3],
    opacity: f32,
    transparent: bool,
    depth_write: bool,
    double_sided: bool,
    center: [f64; 3],
    radius: f64,
}

impl MeshUnitJs {
    fn from_unit(unit: &MeshUnit) -> Self {
        let mesh = unit.mesh();
        let material = unit.material();
        let sphere = unit.bounding_sphere();
        Self {
            owner_id: unit.owner_id,
            part_id: unit.part_id,
            positions: mesh.positions.clone(),
            normals: mesh.normals.clone(),
            indices: mesh.indices.clone(),
            color: material.color,
            opacity: material.opacity,
            transparent: material.transparent,
            depth_write: material.depth_write,
            double_sided: material.double_sided,
            center: sphere.center,
            radius: sphere.radius,
        }
    }
}

#[wasm_bindgen(js_class = MeshUnit)]
impl MeshUnitJs {
    /// Express ID of the owning building element
    #[wasm_bindgen(getter, js_name = ownerId)]
    pub fn owner_id(&self) -> u32 {
        self.owner_id
    }

    /// Express ID of the source geometry
    #[wasm_bindgen(getter, js_name = partId)]
    pub fn part_id(&self) -> u32 {
        self.part_id
    }

    /// World-space positions as Float32Array (copy to JS)
    #[wasm_bindgen(getter)]
    pub fn positions(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.positions[..])
    }

    #[wasm_bindgen(getter)]
    pub fn normals(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(&self.normals[..])
    }

    #[wasm_bindgen(getter)]
    pub fn indices(&self) -> js_sys::Uint32Array {
        js_sys::Uint32Array::from(&self.indices[..])
    }

    /// [r, g, b] in 0..1
    #[wasm_bindgen(getter)]
    pub fn color(&self) -> Vec<f32> {
        self.color.to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    #[wasm_bindgen(getter)]
    pub fn transparent(&self) -> bool {
        self.transparent
    }

    #[wasm_bindgen(getter, js_name = depthWrite)]
    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    #[wasm_bindgen(getter, js_name = doubleSided)]
    pub fn double_sided(&self) -> bool {
        self.double_sided
    }

    #[wasm_bindgen(getter, js_name = vertexCount)]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[wasm_bindgen(getter, js_name = triangleCount)]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bounding sphere as [cx, cy, cz, radius]
    #[wasm_bindgen(getter, js_name = boundingSphere)]
    pub fn bounding_sphere(&self) -> Vec<f64> {
        vec![self.center[0], self.center[1], self.center[2], self.radius]
    }
}

