// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory engine for tests.
//!
//! Every document opened through [`MockEngine`] exposes the same scripted
//! [`MockDocument`], except byte buffers starting with `CORRUPT`, which fail
//! to open. [`MockStats`] counts engine calls so tests can check that every
//! native geometry is released and every opened document is closed.

use crate::engine::{
    DecoderEngine, EngineLoader, FlatMesh, ModelHandle, NativeGeometry, PlacedGeometry,
};
use crate::error::EngineError;
use futures_util::future::{poll_fn, FutureExt, LocalBoxFuture};
use std::cell::Cell;
use std::rc::Rc;
use std::task::Poll;

/// Prefix of byte buffers that the mock engine refuses to open
pub const CORRUPT_MAGIC: &[u8] = b"CORRUPT";

/// Call counters shared between a loader, its engine and its geometries
#[derive(Debug, Default)]
pub struct MockStats {
    setups: Cell<usize>,
    opened: Cell<usize>,
    closed: Cell<usize>,
    acquired: Cell<usize>,
    released: Cell<usize>,
}

impl MockStats {
    pub fn setups(&self) -> usize {
        self.setups.get()
    }

    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn closed(&self) -> usize {
        self.closed.get()
    }

    pub fn acquired(&self) -> usize {
        self.acquired.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    fn bump(cell: &Cell<usize>) {
        cell.set(cell.get() + 1);
    }
}

#[derive(Debug, Clone)]
enum Definition {
    Valid {
        positions: Vec<f32>,
        indices: Vec<u32>,
    },
    Broken(String),
}

/// Scripted document contents
#[derive(Debug, Clone, Default)]
pub struct MockDocument {
    definitions: Vec<(u32, Definition)>,
    meshes: Vec<FlatMesh>,
    listing_error: Option<String>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a geometry definition
    pub fn geometry(mut self, geometry_id: u32, positions: Vec<f32>, indices: Vec<u32>) -> Self {
        self.definitions
            .push((geometry_id, Definition::Valid { positions, indices }));
        self
    }

    /// Register a definition whose fetch fails in the engine
    pub fn broken_geometry(mut self, geometry_id: u32, reason: &str) -> Self {
        self.definitions
            .push((geometry_id, Definition::Broken(reason.to_string())));
        self
    }

    /// Add a part with its placements
    pub fn mesh(mut self, owner_id: u32, placements: Vec<PlacedGeometry>) -> Self {
        self.meshes.push(FlatMesh {
            owner_id,
            placements,
        });
        self
    }

    /// Make geometry listing fail for every opened document
    pub fn fail_listing(mut self, reason: &str) -> Self {
        self.listing_error = Some(reason.to_string());
        self
    }
}

/// Loader that yields once before producing a [`MockEngine`]
pub struct MockLoader {
    document: MockDocument,
    stats: Rc<MockStats>,
    setup_error: Option<String>,
}

impl MockLoader {
    pub fn new(document: MockDocument) -> Self {
        Self {
            document,
            stats: Rc::new(MockStats::default()),
            setup_error: None,
        }
    }

    /// Make every bootstrap attempt fail
    pub fn fail_setup(mut self, reason: &str) -> Self {
        self.setup_error = Some(reason.to_string());
        self
    }

    pub fn stats(&self) -> Rc<MockStats> {
        self.stats.clone()
    }
}

impl EngineLoader for MockLoader {
    type Engine = MockEngine;

    fn load<'a>(
        &'a self,
        _location: &'a str,
    ) -> LocalBoxFuture<'a, Result<Self::Engine, EngineError>> {
        async move {
            yield_once().await;
            if let Some(reason) = &self.setup_error {
                return Err(EngineError::Bootstrap(reason.clone()));
            }
            MockStats::bump(&self.stats.setups);
            Ok(MockEngine {
                document: self.document.clone(),
                stats: self.stats.clone(),
                next_handle: 0,
                open: Vec::new(),
            })
        }
        .boxed_local()
    }
}

/// Suspend exactly once so concurrent callers can interleave
async fn yield_once() {
    let mut yielded = false;
    poll_fn(move |cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

pub struct MockEngine {
    document: MockDocument,
    stats: Rc<MockStats>,
    next_handle: u32,
    open: Vec<ModelHandle>,
}

impl MockEngine {
    fn ensure_open(&self, handle: ModelHandle) -> Result<(), EngineError> {
        if self.open.contains(&handle) {
            Ok(())
        } else {
            Err(EngineError::UnknownHandle(handle.0))
        }
    }
}

impl DecoderEngine for MockEngine {
    type Geometry = MockGeometry;

    fn open_model(&mut self, bytes: &[u8]) -> Result<ModelHandle, EngineError> {
        if bytes.starts_with(CORRUPT_MAGIC) {
            return Err(EngineError::Open("invalid STEP header".into()));
        }
        let handle = ModelHandle(self.next_handle);
        self.next_handle += 1;
        self.open.push(handle);
        MockStats::bump(&self.stats.opened);
        Ok(handle)
    }

    fn close_model(&mut self, handle: ModelHandle) {
        if let Some(pos) = self.open.iter().position(|h| *h == handle) {
            self.open.remove(pos);
            MockStats::bump(&self.stats.closed);
        }
    }

    fn flat_meshes(&mut self, handle: ModelHandle) -> Result<Vec<FlatMesh>, EngineError> {
        self.ensure_open(handle)?;
        if let Some(reason) = &self.document.listing_error {
            return Err(EngineError::Listing {
                handle: handle.0,
                reason: reason.clone(),
            });
        }
        Ok(self.document.meshes.clone())
    }

    fn geometry(
        &mut self,
        handle: ModelHandle,
        geometry_id: u32,
    ) -> Result<MockGeometry, EngineError> {
        self.ensure_open(handle)?;
        let definition = self
            .document
            .definitions
            .iter()
            .find(|(id, _)| *id == geometry_id)
            .map(|(_, def)| def)
            .ok_or_else(|| EngineError::Geometry {
                geometry_id,
                reason: "no such geometry".into(),
            })?;

        match definition {
            Definition::Valid { positions, indices } => {
                MockStats::bump(&self.stats.acquired);
                Ok(MockGeometry {
                    positions: positions.clone(),
                    indices: indices.clone(),
                    stats: self.stats.clone(),
                    released: false,
                })
            }
            Definition::Broken(reason) => Err(EngineError::Geometry {
                geometry_id,
                reason: reason.clone(),
            }),
        }
    }
}

pub struct MockGeometry {
    positions: Vec<f32>,
    indices: Vec<u32>,
    stats: Rc<MockStats>,
    released: bool,
}

impl NativeGeometry for MockGeometry {
    fn positions(&self) -> Result<Vec<f32>, EngineError> {
        Ok(self.positions.clone())
    }

    fn indices(&self) -> Result<Vec<u32>, EngineError> {
        Ok(self.indices.clone())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            MockStats::bump(&self.stats.released);
        }
    }
}
