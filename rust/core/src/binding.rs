// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoder Binding
//!
//! Owns the single engine instance for the process and mediates every call
//! into it. Execution is single-threaded and cooperative, so state lives in
//! `Cell`/`RefCell` and re-entrancy is rejected instead of locked out.

use crate::engine::{
    DecoderEngine, EngineLoader, GeometryGuard, ModelHandle, NativeGeometry, PlacedGeometry,
};
use crate::error::{EngineError, ErrorContext, Precondition, Result, ViewerError};
use crate::raw_part::RawPart;
use std::cell::{Cell, RefCell};

/// Lifecycle of the one-time engine bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Uninitialized,
    Initializing,
    Initialized,
}

/// A placement that could not be copied out of the engine
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPart {
    pub owner_id: u32,
    pub geometry_id: u32,
    /// Running index across the whole document, for diagnostics
    pub placement_index: usize,
    pub reason: String,
}

/// Result of walking every placement of an open document
#[derive(Debug, Default)]
pub struct Extraction {
    pub parts: Vec<RawPart>,
    pub skipped: Vec<SkippedPart>,
}

impl Extraction {
    /// Placements visited, successful or not
    pub fn placement_count(&self) -> usize {
        self.parts.len() + self.skipped.len()
    }
}

/// Sole owner of the foreign engine instance
pub struct DecoderBinding<L: EngineLoader> {
    loader: L,
    state: Cell<SetupState>,
    engine: RefCell<Option<L::Engine>>,
    open_handle: Cell<Option<ModelHandle>>,
    location: RefCell<Option<String>>,
}

impl<L: EngineLoader> DecoderBinding<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            state: Cell::new(SetupState::Uninitialized),
            engine: RefCell::new(None),
            open_handle: Cell::new(None),
            location: RefCell::new(None),
        }
    }

    #[inline]
    pub fn state(&self) -> SetupState {
        self.state.get()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.get() == SetupState::Initialized
    }

    /// Location the engine was successfully bootstrapped from
    pub fn location(&self) -> Option<String> {
        self.location.borrow().clone()
    }

    /// Currently open document, if any
    pub fn open_handle(&self) -> Option<ModelHandle> {
        self.open_handle.get()
    }

    /// Bootstrap the engine from `location`.
    ///
    /// Succeeds at most once; later calls are no-ops. A call made while
    /// another bootstrap is suspended is rejected with `SetupInProgress`.
    pub async fn initialize(&self, location: &str) -> Result<()> {
        match self.state.get() {
            SetupState::Initialized => {
                tracing::debug!(wasm_path = location, "Decoder already initialized");
                return Ok(());
            }
            SetupState::Initializing => {
                return Err(ViewerError::precondition(
                    Precondition::SetupInProgress,
                    ErrorContext {
                        wasm_path: Some(location.to_string()),
                        ..Default::default()
                    },
                ));
            }
            SetupState::Uninitialized => {}
        }

        tracing::info!(wasm_path = location, "Initializing decoder");
        let pending = PendingSetup::begin(&self.state);

        match self.loader.load(location).await {
            Ok(engine) => {
                *self.engine.borrow_mut() = Some(engine);
                *self.location.borrow_mut() = Some(location.to_string());
                pending.commit();
                tracing::info!(wasm_path = location, "Decoder initialized");
                Ok(())
            }
            Err(err) => {
                tracing::error!(wasm_path = location, error = %err, "Decoder setup failed");
                Err(ViewerError::setup(location, err))
            }
        }
    }

    /// Open `bytes` as a document. Only one document may be open at a time.
    pub fn open_file(&self, bytes: &[u8]) -> std::result::Result<ModelHandle, EngineError> {
        if let Some(handle) = self.open_handle.get() {
            return Err(EngineError::DocumentAlreadyOpen(handle.0));
        }
        let mut engine = self.engine.borrow_mut();
        let engine = match (self.state.get(), engine.as_mut()) {
            (SetupState::Initialized, Some(engine)) => engine,
            _ => return Err(EngineError::NotInitialized),
        };

        let handle = engine.open_model(bytes)?;
        self.open_handle.set(Some(handle));
        tracing::debug!(handle = handle.0, size = bytes.len(), "Opened document");
        Ok(handle)
    }

    /// Open `bytes` and tie the handle's lifetime to the returned guard.
    pub fn open_document(
        &self,
        bytes: &[u8],
    ) -> std::result::Result<OpenDocument<'_, L>, EngineError> {
        let handle = self.open_file(bytes)?;
        Ok(OpenDocument {
            binding: self,
            handle,
        })
    }

    /// Release engine-side resources of `handle`. Unknown handles are ignored.
    pub fn close_file(&self, handle: ModelHandle) {
        if self.open_handle.get() != Some(handle) {
            tracing::debug!(handle = handle.0, "Ignoring close of a handle that is not open");
            return;
        }
        if let Some(engine) = self.engine.borrow_mut().as_mut() {
            engine.close_model(handle);
        }
        self.open_handle.set(None);
        tracing::debug!(handle = handle.0, "Closed document");
    }

    /// Copy every placement of the document out of engine memory.
    ///
    /// Yields one [`RawPart`] per placement. Each native geometry is released
    /// right after its buffers are copied; a failing placement is recorded as
    /// a [`SkippedPart`] and extraction moves on.
    pub fn extract_all_geometry(
        &self,
        handle: ModelHandle,
    ) -> std::result::Result<Extraction, EngineError> {
        if self.open_handle.get() != Some(handle) {
            return Err(EngineError::UnknownHandle(handle.0));
        }
        let mut engine = self.engine.borrow_mut();
        let engine = engine.as_mut().ok_or(EngineError::NotInitialized)?;

        let flat_meshes = engine.flat_meshes(handle)?;
        let mut extraction = Extraction::default();
        let mut placement_index = 0usize;

        for flat in flat_meshes {
            for placed in &flat.placements {
                match copy_placement(engine, handle, flat.owner_id, placed) {
                    Ok(part) => extraction.parts.push(part),
                    Err(err) => {
                        tracing::warn!(
                            placement_index,
                            owner_id = flat.owner_id,
                            geometry_id = placed.geometry_id,
                            error = %err,
                            "Skipping placement"
                        );
                        extraction.skipped.push(SkippedPart {
                            owner_id: flat.owner_id,
                            geometry_id: placed.geometry_id,
                            placement_index,
                            reason: err.to_string(),
                        });
                    }
                }
                placement_index += 1;
            }
        }

        tracing::debug!(
            handle = handle.0,
            parts = extraction.parts.len(),
            skipped = extraction.skipped.len(),
            "Extracted geometry"
        );
        Ok(extraction)
    }
}

fn copy_placement<E: DecoderEngine>(
    engine: &mut E,
    handle: ModelHandle,
    owner_id: u32,
    placed: &PlacedGeometry,
) -> std::result::Result<RawPart, EngineError> {
    let geometry = GeometryGuard::new(engine.geometry(handle, placed.geometry_id)?);
    let positions = geometry.positions()?;
    let indices = geometry.indices()?;
    drop(geometry);

    Ok(RawPart {
        positions,
        indices,
        transform: placed.transform,
        color: placed.color,
        owner_id,
        part_id: placed.geometry_id,
    })
}

/// Marks the binding as initializing; reverts to uninitialized unless committed.
struct PendingSetup<'a> {
    state: &'a Cell<SetupState>,
    committed: bool,
}

impl<'a> PendingSetup<'a> {
    fn begin(state: &'a Cell<SetupState>) -> Self {
        state.set(SetupState::Initializing);
        Self {
            state,
            committed: false,
        }
    }

    fn commit(mut self) {
        self.committed = true;
        self.state.set(SetupState::Initialized);
    }
}

impl Drop for PendingSetup<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.state.set(SetupState::Uninitialized);
        }
    }
}

/// An open document that is closed when the guard goes out of scope
pub struct OpenDocument<'a, L: EngineLoader> {
    binding: &'a DecoderBinding<L>,
    handle: ModelHandle,
}

impl<L: EngineLoader> OpenDocument<'_, L> {
    #[inline]
    pub fn handle(&self) -> ModelHandle {
        self.handle
    }

    pub fn extract_all_geometry(&self) -> std::result::Result<Extraction, EngineError> {
        self.binding.extract_all_geometry(self.handle)
    }
}

impl<L: EngineLoader> Drop for OpenDocument<'_, L> {
    fn drop(&mut self) {
        self.binding.close_file(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PlacedGeometry;
    use crate::mock::{MockDocument, MockLoader};

    fn triangle() -> (Vec<f32>, Vec<u32>) {
        (vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![0, 1, 2])
    }

    fn document() -> MockDocument {
        let (positions, indices) = triangle();
        MockDocument::new()
            .geometry(10, positions.clone(), indices.clone())
            .geometry(11, positions, indices)
            .broken_geometry(12, "corrupt sub-geometry")
            .mesh(1, vec![PlacedGeometry::new(10), PlacedGeometry::new(10)])
            .mesh(2, vec![PlacedGeometry::new(12), PlacedGeometry::new(11)])
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let loader = MockLoader::new(document());
        let stats = loader.stats();
        let binding = DecoderBinding::new(loader);

        binding.initialize("/wasm/").await.unwrap();
        binding.initialize("/wasm/").await.unwrap();

        assert!(binding.is_initialized());
        assert_eq!(stats.setups(), 1);
        assert_eq!(binding.location().as_deref(), Some("/wasm/"));
    }

    #[tokio::test]
    async fn test_concurrent_initialize_rejects_second() {
        let loader = MockLoader::new(document());
        let stats = loader.stats();
        let binding = DecoderBinding::new(loader);

        let (first, second) =
            tokio::join!(binding.initialize("/wasm/"), binding.initialize("/wasm/"));

        assert!(first.is_ok());
        let err = second.unwrap_err();
        assert_eq!(err.code(), "SETUP_IN_PROGRESS");
        assert_eq!(err.context().wasm_path.as_deref(), Some("/wasm/"));
        assert_eq!(stats.setups(), 1);
        assert!(binding.is_initialized());
    }

    #[tokio::test]
    async fn test_failed_setup_reverts_to_uninitialized() {
        let loader = MockLoader::new(document()).fail_setup("module not found");
        let binding = DecoderBinding::new(loader);

        let err = binding.initialize("https://cdn.invalid/").await.unwrap_err();
        assert_eq!(err.code(), "SETUP_FAILED");
        assert!(!err.is_recoverable());
        assert_eq!(err.context().wasm_path.as_deref(), Some("https://cdn.invalid/"));
        assert_eq!(binding.state(), SetupState::Uninitialized);
        assert!(binding.location().is_none());
    }

    #[test]
    fn test_open_requires_initialization() {
        let binding = DecoderBinding::new(MockLoader::new(document()));
        assert_eq!(binding.open_file(b"ISO-10303-21;"), Err(EngineError::NotInitialized));
    }

    #[tokio::test]
    async fn test_extraction_skips_broken_placements_and_releases_each() {
        let loader = MockLoader::new(document());
        let stats = loader.stats();
        let binding = DecoderBinding::new(loader);
        binding.initialize("/wasm/").await.unwrap();

        let handle = binding.open_file(b"ISO-10303-21;").unwrap();
        let extraction = binding.extract_all_geometry(handle).unwrap();
        binding.close_file(handle);

        assert_eq!(extraction.placement_count(), 4);
        assert_eq!(extraction.parts.len(), 3);
        assert_eq!(extraction.skipped.len(), 1);
        let skipped = &extraction.skipped[0];
        assert_eq!(skipped.owner_id, 2);
        assert_eq!(skipped.geometry_id, 12);
        assert_eq!(skipped.placement_index, 2);

        // Owner 1 contributes one part per placement
        assert_eq!(extraction.parts.iter().filter(|p| p.owner_id == 1).count(), 2);

        assert_eq!(stats.acquired(), stats.released());
        assert_eq!(stats.closed(), 1);
        assert!(binding.open_handle().is_none());
    }

    #[tokio::test]
    async fn test_single_open_document() {
        let binding = DecoderBinding::new(MockLoader::new(document()));
        binding.initialize("/wasm/").await.unwrap();

        let handle = binding.open_file(b"a").unwrap();
        assert_eq!(
            binding.open_file(b"b"),
            Err(EngineError::DocumentAlreadyOpen(handle.0))
        );
        binding.close_file(handle);
        binding.close_file(handle);
        assert!(binding.open_file(b"b").is_ok());
    }

    #[tokio::test]
    async fn test_open_document_guard_closes_on_drop() {
        let loader = MockLoader::new(document().fail_listing("truncated file"));
        let stats = loader.stats();
        let binding = DecoderBinding::new(loader);
        binding.initialize("/wasm/").await.unwrap();

        {
            let doc = binding.open_document(b"ISO-10303-21;").unwrap();
            assert!(doc.extract_all_geometry().is_err());
        }

        assert_eq!(stats.closed(), 1);
        assert!(binding.open_handle().is_none());
    }

    #[tokio::test]
    async fn test_extract_unknown_handle() {
        let binding = DecoderBinding::new(MockLoader::new(document()));
        binding.initialize("/wasm/").await.unwrap();
        assert_eq!(
            binding.extract_all_geometry(ModelHandle(42)).unwrap_err(),
            EngineError::UnknownHandle(42)
        );
    }
}
