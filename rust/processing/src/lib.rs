// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-View Processing
//!
//! The staged load pipeline shared by every host: read the file, open it in
//! the decoder, copy out and convert every placement, and assemble a
//! disposable [`Model`].
//!
//! ```rust,ignore
//! use ifc_view_processing::{InMemoryFile, ModelLoader};
//!
//! let loader = ModelLoader::new(engine_loader);
//! loader.initialize("/wasm/").await?;
//!
//! let file = InMemoryFile::new("house.ifc", bytes);
//! let model = loader
//!     .load(&file, &mut |event: &ProgressEvent| println!("{}% {}", event.percent, event.message))
//!     .await?;
//! println!("{} meshes", model.metadata().mesh_count);
//! ```

pub mod assembly;
pub mod loader;
pub mod model;
pub mod progress;
pub mod source;

pub use assembly::{assemble_model, generate_model_id};
pub use loader::ModelLoader;
pub use model::{Model, ModelGroup, ModelMetadata};
pub use progress::{LoadStage, NoProgress, ProgressEvent, ProgressSink};
#[cfg(not(target_arch = "wasm32"))]
pub use source::DiskFile;
pub use source::{FileSource, InMemoryFile};
