// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON model documents

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::BimModel;

/// Reads and writes model documents (pretty JSON, two-space indent)
pub struct ModelExporter;

impl ModelExporter {
    /// Write `model` to `path`, replacing any existing file
    ///
    /// A failed write leaves `model` untouched.
    pub fn write(model: &BimModel, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::export(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, model).map_err(|e| Error::export(path, e))?;
        writer.flush().map_err(|e| Error::export(path, e))?;

        tracing::info!(path = %path.display(), elements = model.elements.len(), "model exported");
        Ok(())
    }

    pub fn to_json_value(model: &BimModel) -> Result<serde_json::Value> {
        serde_json::to_value(model).map_err(|e| Error::export("<memory>", e))
    }

    pub fn to_json_string(model: &BimModel) -> Result<String> {
        serde_json::to_string_pretty(model).map_err(|e| Error::export("<memory>", e))
    }

    /// Load a document previously written by [`ModelExporter::write`]
    pub fn read(path: impl AsRef<Path>) -> Result<BimModel> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::document(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::document(path, e))
    }
}
