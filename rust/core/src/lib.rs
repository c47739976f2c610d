// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-View Core
//!
//! Binding to the foreign IFC decoding engine and the shared error taxonomy.
//!
//! ## Overview
//!
//! - **Decoder Binding**: one engine instance per process, bootstrapped once
//!   ([`DecoderBinding::initialize`]), one open document at a time
//! - **Raw parts**: every placed geometry copied out of engine memory as an
//!   owned [`RawPart`], with the native object released immediately after
//! - **Errors**: [`ViewerError`] with machine codes, recoverability and
//!   structured context
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_view_core::{DecoderBinding, DecoderConfig};
//!
//! let binding = DecoderBinding::new(loader);
//! binding.initialize(DecoderConfig::default().resolve_location()).await?;
//!
//! let document = binding.open_document(&bytes)?;
//! let extraction = document.extract_all_geometry()?;
//! println!("{} parts, {} skipped", extraction.parts.len(), extraction.skipped.len());
//! ```

pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod raw_part;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use binding::{DecoderBinding, Extraction, OpenDocument, SetupState, SkippedPart};
pub use config::DecoderConfig;
pub use engine::{
    DecoderEngine, EngineLoader, FlatMesh, GeometryGuard, ModelHandle, NativeGeometry,
    PlacedGeometry, IDENTITY_TRANSFORM,
};
pub use error::{
    EngineError, ErrorContext, ErrorKind, ErrorReport, Precondition, Result, ViewerError,
};
pub use raw_part::RawPart;
