// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during shape generation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Element #{0} has no representation")]
    NoRepresentation(u32),

    #[error("Unsupported representation item: {0}")]
    UnsupportedItem(String),

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    #[error("Core parser error: {0}")]
    CoreError(#[from] twin_bim_core::Error),
}

impl Error {
    pub fn geometry(message: impl Into<String>) -> Self {
        Error::Geometry(message.into())
    }
}
