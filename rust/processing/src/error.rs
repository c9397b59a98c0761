// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use crate::kernel::KernelError;

pub type Result<T> = std::result::Result<T, Error>;

/// Invocation-level failures
///
/// Anything below the element boundary is downgraded to a default and
/// recorded in [`crate::Diagnostics`]; only these escape the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IFC kernel '{kernel}' is unavailable: {reason}")]
    KernelUnavailable { kernel: String, reason: String },

    #[error("Failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: KernelError,
    },

    #[error("Failed to export model to {path}: {message}")]
    Export { path: PathBuf, message: String },

    #[error("Invalid model document {path}: {message}")]
    Document { path: PathBuf, message: String },
}

/// Discriminant of [`Error`] for callers that branch on the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    KernelUnavailable,
    FileOpen,
    Export,
    Document,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::KernelUnavailable { .. } => ErrorKind::KernelUnavailable,
            Error::FileOpen { .. } => ErrorKind::FileOpen,
            Error::Export { .. } => ErrorKind::Export,
            Error::Document { .. } => ErrorKind::Document,
        }
    }

    pub(crate) fn export(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Export {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn document(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Document {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
