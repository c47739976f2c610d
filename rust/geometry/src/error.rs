// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a single placement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Malformed {buffer} buffer: length {len} is not a multiple of 3")]
    MalformedBuffer { buffer: &'static str, len: usize },

    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    #[error("Non-finite vertex position at vertex {0}")]
    NonFinitePosition(usize),
}
