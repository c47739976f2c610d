// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! web-ifc engine bridge
//!
//! Binds the host page's `IfcAPI` instance to the [`EngineLoader`] and
//! [`DecoderEngine`] seams. Geometry lives in web-ifc's own heap; every
//! buffer is copied out with `to_vec` before the native object is deleted.

use crate::utils::describe_js_error;
use futures_util::future::{FutureExt, LocalBoxFuture};
use ifc_view_core::{
    DecoderEngine, EngineError, EngineLoader, FlatMesh, ModelHandle, NativeGeometry,
    PlacedGeometry,
};
use js_sys::{Array, Float32Array, Promise, Uint32Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Interleaved vertex layout: position xyz followed by normal xyz
const VERTEX_STRIDE: usize = 6;

#[wasm_bindgen]
extern "C" {
    /// A web-ifc `IfcAPI` instance created by the host page
    #[wasm_bindgen(typescript_type = "IfcAPI")]
    #[derive(Clone, Debug)]
    pub type IfcApi;

    #[wasm_bindgen(method, catch, js_name = SetWasmPath)]
    fn set_wasm_path(this: &IfcApi, path: &str, absolute: bool) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = Init)]
    fn init(this: &IfcApi) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = OpenModel)]
    fn open_model(this: &IfcApi, data: &Uint8Array) -> Result<i32, JsValue>;

    #[wasm_bindgen(method, js_name = CloseModel)]
    fn close_model(this: &IfcApi, model_id: i32);

    #[wasm_bindgen(method, catch, js_name = LoadAllGeometry)]
    fn load_all_geometry(this: &IfcApi, model_id: i32) -> Result<FlatMeshVector, JsValue>;

    #[wasm_bindgen(method, catch, js_name = GetGeometry)]
    fn get_geometry(
        this: &IfcApi,
        model_id: i32,
        geometry_id: u32,
    ) -> Result<IfcGeometry, JsValue>;

    #[wasm_bindgen(method, catch, js_name = GetVertexArray)]
    fn get_vertex_array(this: &IfcApi, ptr: f64, size: f64) -> Result<Float32Array, JsValue>;

    #[wasm_bindgen(method, catch, js_name = GetIndexArray)]
    fn get_index_array(this: &IfcApi, ptr: f64, size: f64) -> Result<Uint32Array, JsValue>;

    type FlatMeshVector;

    #[wasm_bindgen(method)]
    fn size(this: &FlatMeshVector) -> u32;

    #[wasm_bindgen(method)]
    fn get(this: &FlatMeshVector, index: u32) -> JsFlatMesh;

    type JsFlatMesh;

    #[wasm_bindgen(method, getter, js_name = expressID)]
    fn express_id(this: &JsFlatMesh) -> u32;

    #[wasm_bindgen(method, getter)]
    fn geometries(this: &JsFlatMesh) -> PlacedGeometryVector;

    type PlacedGeometryVector;

    #[wasm_bindgen(method)]
    fn size(this: &PlacedGeometryVector) -> u32;

    #[wasm_bindgen(method)]
    fn get(this: &PlacedGeometryVector, index: u32) -> JsPlacedGeometry;

    type JsPlacedGeometry;

    #[wasm_bindgen(method, getter)]
    fn color(this: &JsPlacedGeometry) -> JsColor;

    #[wasm_bindgen(method, getter, js_name = flatTransformation)]
    fn flat_transformation(this: &JsPlacedGeometry) -> JsValue;

    #[wasm_bindgen(method, getter, js_name = geometryExpressID)]
    fn geometry_express_id(this: &JsPlacedGeometry) -> u32;

    type JsColor;

    #[wasm_bindgen(method, getter)]
    fn x(this: &JsColor) -> f64;
    #[wasm_bindgen(method, getter)]
    fn y(this: &JsColor) -> f64;
    #[wasm_bindgen(method, getter)]
    fn z(this: &JsColor) -> f64;
    #[wasm_bindgen(method, getter)]
    fn w(this: &JsColor) -> f64;

    type IfcGeometry;

    #[wasm_bindgen(method, js_name = GetVertexData)]
    fn vertex_data(this: &IfcGeometry) -> f64;

    #[wasm_bindgen(method, js_name = GetVertexDataSize)]
    fn vertex_data_size(this: &IfcGeometry) -> f64;

    #[wasm_bindgen(method, js_name = GetIndexData)]
    fn index_data(this: &IfcGeometry) -> f64;

    #[wasm_bindgen(method, js_name = GetIndexDataSize)]
    fn index_data_size(this: &IfcGeometry) -> f64;

    #[wasm_bindgen(method)]
    fn delete(this: &IfcGeometry);
}

/// Boots web-ifc from a WASM location
pub struct WebIfcLoader {
    api: IfcApi,
}

impl WebIfcLoader {
    pub fn new(api: IfcApi) -> Self {
        Self { api }
    }
}

impl EngineLoader for WebIfcLoader {
    type Engine = WebIfcEngine;

    fn load<'a>(
        &'a self,
        location: &'a str,
    ) -> LocalBoxFuture<'a, Result<WebIfcEngine, EngineError>> {
        async move {
            // Absolute URLs and rooted paths bypass web-ifc's script-relative lookup
            let absolute = location.starts_with('/') || location.contains("://");
            let bootstrap = |e: JsValue| EngineError::Bootstrap(describe_js_error(&e));
            self.api.set_wasm_path(location, absolute).map_err(bootstrap)?;
            let init = self.api.init().map_err(bootstrap)?;
            JsFuture::from(init).await.map_err(bootstrap)?;

            Ok(WebIfcEngine {
                api: self.api.clone(),
            })
        }
        .boxed_local()
    }
}

/// Initialized web-ifc instance
pub struct WebIfcEngine {
    api: IfcApi,
}

impl DecoderEngine for WebIfcEngine {
    type Geometry = WebIfcGeometry;

    fn open_model(&mut self, bytes: &[u8]) -> Result<ModelHandle, EngineError> {
        let data = Uint8Array::from(bytes);
        let id = self
            .api
            .open_model(&data)
            .map_err(|e| EngineError::Open(describe_js_error(&e)))?;
        if id < 0 {
            return Err(EngineError::Open(format!("engine returned model id {}", id)));
        }
        Ok(ModelHandle(id as u32))
    }

    fn close_model(&mut self, handle: ModelHandle) {
        self.api.close_model(handle.0 as i32);
    }

    fn flat_meshes(&mut self, handle: ModelHandle) -> Result<Vec<FlatMesh>, EngineError> {
        let listing = self
            .api
            .load_all_geometry(handle.0 as i32)
            .map_err(|e| EngineError::Listing {
                handle: handle.0,
                reason: describe_js_error(&e),
            })?;

        let mut meshes = Vec::with_capacity(listing.size() as usize);
        for i in 0..listing.size() {
            let flat = listing.get(i);
            let geometries = flat.geometries();
            let placements: Vec<PlacedGeometry> = (0..geometries.size())
                .map(|j| read_placement(&geometries.get(j)))
                .collect();
            if placements.is_empty() {
                continue;
            }
            meshes.push(FlatMesh {
                owner_id: flat.express_id(),
                placements,
            });
        }
        Ok(meshes)
    }

    fn geometry(
        &mut self,
        handle: ModelHandle,
        geometry_id: u32,
    ) -> Result<WebIfcGeometry, EngineError> {
        let geometry = self
            .api
            .get_geometry(handle.0 as i32, geometry_id)
            .map_err(|e| EngineError::Geometry {
                geometry_id,
                reason: describe_js_error(&e),
            })?;
        Ok(WebIfcGeometry {
            api: self.api.clone(),
            geometry,
            geometry_id,
            released: false,
        })
    }
}

fn read_placement(placed: &JsPlacedGeometry) -> PlacedGeometry {
    let c = placed.color();
    let color = [c.x() as f32, c.y() as f32, c.z() as f32, c.w() as f32];

    let values: Vec<f64> = Array::from(&placed.flat_transformation())
        .iter()
        .map(|v| v.as_f64().unwrap_or(f64::NAN))
        .collect();
    // Wrong-sized matrices surface as an invalid transform during conversion
    let transform = <[f64; 16]>::try_from(values.as_slice()).unwrap_or([f64::NAN; 16]);

    PlacedGeometry::new(placed.geometry_express_id())
        .with_color(color)
        .with_transform(transform)
}

/// Geometry object owned by web-ifc until [`NativeGeometry::release`]
pub struct WebIfcGeometry {
    api: IfcApi,
    geometry: IfcGeometry,
    geometry_id: u32,
    released: bool,
}

impl WebIfcGeometry {
    fn fail(&self, reason: impl Into<String>) -> EngineError {
        EngineError::Geometry {
            geometry_id: self.geometry_id,
            reason: reason.into(),
        }
    }
}

impl NativeGeometry for WebIfcGeometry {
    fn positions(&self) -> Result<Vec<f32>, EngineError> {
        let array = self
            .api
            .get_vertex_array(self.geometry.vertex_data(), self.geometry.vertex_data_size())
            .map_err(|e| self.fail(describe_js_error(&e)))?;
        let interleaved = array.to_vec();
        if interleaved.len() % VERTEX_STRIDE != 0 {
            return Err(self.fail(format!(
                "vertex data length {} is not a multiple of {}",
                interleaved.len(),
                VERTEX_STRIDE
            )));
        }

        let mut positions = Vec::with_capacity(interleaved.len() / 2);
        for vertex in interleaved.chunks_exact(VERTEX_STRIDE) {
            positions.extend_from_slice(&vertex[..3]);
        }
        Ok(positions)
    }

    fn indices(&self) -> Result<Vec<u32>, EngineError> {
        let array = self
            .api
            .get_index_array(self.geometry.index_data(), self.geometry.index_data_size())
            .map_err(|e| self.fail(describe_js_error(&e)))?;
        Ok(array.to_vec())
    }

    fn release(&mut self) {
        if !self.released {
            self.geometry.delete();
            self.released = true;
        }
    }
}
