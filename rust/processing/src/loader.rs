// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Progress/Lifecycle Coordinator
//!
//! Sequences one load through `Reading -> Opening -> GeneratingGeometry ->
//! Finalizing -> Complete`, reporting each checkpoint. Any failure moves the
//! load to the failed state: the opened document is still closed and no
//! previously returned model is touched.

use crate::assembly::{assemble_model, now_millis};
use crate::model::Model;
use crate::progress::{LoadStage, ProgressEvent, ProgressSink};
use crate::source::FileSource;
use ifc_view_core::{
    DecoderBinding, DecoderConfig, EngineLoader, ErrorContext, Precondition, Result, SetupState,
    ViewerError,
};
use ifc_view_geometry::convert_parts;
use std::cell::Cell;

/// Builds models from files through the single decoder binding
pub struct ModelLoader<L: EngineLoader> {
    binding: DecoderBinding<L>,
    loading: Cell<bool>,
}

impl<L: EngineLoader> ModelLoader<L> {
    pub fn new(loader: L) -> Self {
        Self {
            binding: DecoderBinding::new(loader),
            loading: Cell::new(false),
        }
    }

    #[inline]
    pub fn binding(&self) -> &DecoderBinding<L> {
        &self.binding
    }

    /// One-time decoder setup; see [`DecoderBinding::initialize`]
    pub async fn initialize(&self, location: &str) -> Result<()> {
        self.binding.initialize(location).await
    }

    pub async fn initialize_with(&self, config: &DecoderConfig) -> Result<()> {
        self.binding.initialize(config.resolve_location()).await
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.binding.is_initialized()
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Load `file` into a new [`Model`].
    ///
    /// Fails fast, before any progress is reported, while the decoder is
    /// initializing, before it is initialized, or while another load runs.
    pub async fn load<F, P>(&self, file: &F, progress: &mut P) -> Result<Model>
    where
        F: FileSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        self.check_preconditions(file)?;
        let _flight = LoadFlight::begin(&self.loading);

        let started = now_millis();
        tracing::info!(file_name = file.name(), file_size = file.size(), "Loading model");

        let result = self.run(file, progress).await;
        match &result {
            Ok(model) => {
                let meta = model.metadata();
                tracing::info!(
                    file_name = file.name(),
                    model_id = %meta.id,
                    meshes = meta.mesh_count,
                    vertices = meta.vertex_count,
                    skipped = meta.stats.skipped(),
                    elapsed_ms = now_millis().saturating_sub(started),
                    "Model loaded"
                );
            }
            Err(err) => {
                tracing::error!(
                    file_name = file.name(),
                    code = err.code(),
                    error = %err,
                    "Model load failed"
                );
            }
        }
        result
    }

    fn check_preconditions<F: FileSource + ?Sized>(&self, file: &F) -> Result<()> {
        let kind = match self.binding.state() {
            SetupState::Initializing => Some(Precondition::StillInitializing),
            SetupState::Uninitialized => Some(Precondition::NotInitialized),
            SetupState::Initialized if self.loading.get() => Some(Precondition::LoadInProgress),
            SetupState::Initialized => None,
        };

        match kind {
            Some(kind) => Err(ViewerError::precondition(
                kind,
                ErrorContext {
                    file_name: Some(file.name().to_string()),
                    file_size: Some(file.size()),
                    wasm_path: self.binding.location(),
                    ..Default::default()
                },
            )),
            None => Ok(()),
        }
    }

    async fn run<F, P>(&self, file: &F, progress: &mut P) -> Result<Model>
    where
        F: FileSource + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let file_name = file.name();
        let file_size = file.size();
        let fail = |stage: LoadStage, err: String| {
            ViewerError::load(file_name, file_size, format!("{} stage failed: {}", stage, err))
        };

        enter(progress, LoadStage::Reading);
        let bytes = file
            .read_bytes()
            .await
            .map_err(|e| fail(LoadStage::Reading, e.to_string()))?;

        enter(progress, LoadStage::Opening);
        let document = self
            .binding
            .open_document(&bytes)
            .map_err(|e| fail(LoadStage::Opening, e.to_string()))?;

        enter(progress, LoadStage::GeneratingGeometry);
        let extraction = document
            .extract_all_geometry()
            .map_err(|e| fail(LoadStage::GeneratingGeometry, e.to_string()))?;
        // Everything is copied out; release the document before converting
        drop(document);

        let engine_failures = extraction.skipped.len();
        let batch = convert_parts(extraction.parts);
        let mut stats = batch.stats;
        stats.placements += engine_failures;
        stats.failed += engine_failures;

        enter(progress, LoadStage::Finalizing);
        let model = assemble_model(file_name, bytes, batch.meshes, stats);

        enter(progress, LoadStage::Complete);
        Ok(model)
    }
}

fn enter<P: ProgressSink + ?Sized>(progress: &mut P, stage: LoadStage) {
    tracing::debug!(stage = stage.label(), percent = stage.percent(), "Load stage");
    progress.report(&ProgressEvent::at(stage));
}

/// Holds the single-flight load flag for the duration of one load
struct LoadFlight<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> LoadFlight<'a> {
    fn begin(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for LoadFlight<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
