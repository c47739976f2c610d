// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error taxonomy shared by every stage of the viewer pipeline.

use serde::Serialize;
use thiserror::Error;

/// Result type for viewer-facing operations
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Errors raised by the foreign decoding engine itself.
///
/// These never reach the caller directly: the binding and the load
/// coordinator wrap them with file or module context first.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("Failed to open document: {0}")]
    Open(String),

    #[error("Failed to list geometry for model {handle}: {reason}")]
    Listing { handle: u32, reason: String },

    #[error("Failed to fetch geometry #{geometry_id}: {reason}")]
    Geometry { geometry_id: u32, reason: String },

    #[error("Decoder is not initialized")]
    NotInitialized,

    #[error("Model {0} is already open; close it before opening another document")]
    DocumentAlreadyOpen(u32),

    #[error("Unknown model handle {0}")]
    UnknownHandle(u32),
}

/// Coarse classification of a [`ViewerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Engine bootstrap failed; the viewer is unusable until setup is retried.
    Setup,
    /// Anything between reading the file and finalizing the model.
    Load,
    /// Operation attempted in the wrong lifecycle state.
    Precondition,
    /// A model resource was accessed after `dispose()`.
    DisposedAccess,
}

/// Which lifecycle precondition was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    NotInitialized,
    StillInitializing,
    SetupInProgress,
    LoadInProgress,
}

impl Precondition {
    fn describe(self) -> &'static str {
        match self {
            Precondition::NotInitialized => "decoder is not initialized",
            Precondition::StillInitializing => "decoder is still initializing",
            Precondition::SetupInProgress => "decoder setup is already in progress",
            Precondition::LoadInProgress => "another model load is already in progress",
        }
    }
}

impl std::fmt::Display for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Structured diagnostic context carried by every [`ViewerError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wasm_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

/// Errors surfaced to the caller of the viewer pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    #[error("Decoder setup failed for '{wasm_path}': {reason}")]
    Setup { wasm_path: String, reason: String },

    /// Host-supplied decoder configuration could not be read; setup never started.
    #[error("Invalid decoder configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load '{file_name}' ({file_size} bytes): {reason}")]
    Load {
        file_name: String,
        file_size: u64,
        reason: String,
    },

    #[error("Cannot proceed: {kind}")]
    Precondition {
        kind: Precondition,
        context: ErrorContext,
    },

    #[error("Model {model_id} accessed after dispose ({resource})")]
    DisposedAccess {
        model_id: String,
        resource: &'static str,
    },
}

impl ViewerError {
    pub fn setup(wasm_path: impl Into<String>, reason: impl ToString) -> Self {
        ViewerError::Setup {
            wasm_path: wasm_path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(reason: impl ToString) -> Self {
        ViewerError::InvalidConfig(reason.to_string())
    }

    pub fn load(file_name: impl Into<String>, file_size: u64, reason: impl ToString) -> Self {
        ViewerError::Load {
            file_name: file_name.into(),
            file_size,
            reason: reason.to_string(),
        }
    }

    pub fn precondition(kind: Precondition, context: ErrorContext) -> Self {
        ViewerError::Precondition { kind, context }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ViewerError::Setup { .. } => "SETUP_FAILED",
            ViewerError::InvalidConfig(_) => "INVALID_CONFIG",
            ViewerError::Load { .. } => "LOAD_FAILED",
            ViewerError::Precondition { kind, .. } => match kind {
                Precondition::NotInitialized => "NOT_INITIALIZED",
                Precondition::StillInitializing => "STILL_INITIALIZING",
                Precondition::SetupInProgress => "SETUP_IN_PROGRESS",
                Precondition::LoadInProgress => "LOAD_IN_PROGRESS",
            },
            ViewerError::DisposedAccess { .. } => "DISPOSED_ACCESS",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ViewerError::Setup { .. } | ViewerError::InvalidConfig(_) => ErrorKind::Setup,
            ViewerError::Load { .. } => ErrorKind::Load,
            ViewerError::Precondition { .. } => ErrorKind::Precondition,
            ViewerError::DisposedAccess { .. } => ErrorKind::DisposedAccess,
        }
    }

    /// Only a failed setup leaves the viewer unusable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ViewerError::Setup { .. })
    }

    pub fn context(&self) -> ErrorContext {
        match self {
            ViewerError::Setup { wasm_path, .. } => ErrorContext {
                wasm_path: Some(wasm_path.clone()),
                ..Default::default()
            },
            ViewerError::Load {
                file_name,
                file_size,
                ..
            } => ErrorContext {
                file_name: Some(file_name.clone()),
                file_size: Some(*file_size),
                ..Default::default()
            },
            ViewerError::InvalidConfig(_) => ErrorContext::default(),
            ViewerError::Precondition { context, .. } => context.clone(),
            ViewerError::DisposedAccess { model_id, .. } => ErrorContext {
                model_id: Some(model_id.clone()),
                ..Default::default()
            },
        }
    }

    /// Serializable snapshot used by bindings to build host-side error objects.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
            kind: self.kind(),
            recoverable: self.is_recoverable(),
            context: self.context(),
        }
    }
}

/// Flat, serializable view of a [`ViewerError`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: &'static str,
    pub message: String,
    pub kind: ErrorKind,
    pub recoverable: bool,
    pub context: ErrorContext,
}
