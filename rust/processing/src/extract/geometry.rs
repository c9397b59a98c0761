// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry adapter
//!
//! Calls the kernel's shape generation and reshapes the flat buffers into
//! vertex/face/edge tuples. Kernel errors, malformed buffers and panics
//! inside the kernel all downgrade to the empty geometry.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::kernel::{EntityHandle, FileHandle, ShapeBuffers};
use crate::model::{Geometry, GeometryKind};
use crate::outcome::FieldOutcome;
use crate::settings::ShapeSettings;

pub fn extract_geometry<F: FileHandle>(
    file: &F,
    entity: &F::Entity,
    settings: &ShapeSettings,
) -> FieldOutcome<Geometry> {
    let generated = panic::catch_unwind(AssertUnwindSafe(|| file.generate_shape(settings, entity)));

    let outcome = match generated {
        Ok(Ok(buffers)) => match reshape(buffers) {
            Ok(geometry) => return FieldOutcome::Ok(geometry),
            Err(reason) => FieldOutcome::Skipped(format!("malformed shape buffers: {}", reason)),
        },
        Ok(Err(e)) => FieldOutcome::skipped(e),
        Err(payload) => FieldOutcome::Skipped(format!("kernel panicked: {}", panic_message(payload.as_ref()))),
    };

    if let FieldOutcome::Skipped(reason) = &outcome {
        tracing::warn!(entity = entity.id(), kind = entity.type_name(), %reason, "geometry extraction failed");
    }
    outcome
}

/// Reshape flat kernel buffers into a mesh geometry record
///
/// Buffer lengths must be whole tuples, every index must address a vertex
/// and every coordinate must be finite.
pub fn reshape(buffers: ShapeBuffers) -> Result<Geometry, String> {
    let ShapeBuffers { verts, faces, edges } = buffers;

    if verts.len() % 3 != 0 {
        return Err(format!("vertex buffer length {} is not a multiple of 3", verts.len()));
    }
    if faces.len() % 3 != 0 {
        return Err(format!("face buffer length {} is not a multiple of 3", faces.len()));
    }
    if edges.len() % 2 != 0 {
        return Err(format!("edge buffer length {} is not a multiple of 2", edges.len()));
    }
    if let Some(value) = verts.iter().find(|v| !v.is_finite()) {
        return Err(format!("non-finite coordinate {}", value));
    }

    let vertex_count = verts.len() / 3;
    if let Some(index) = faces
        .iter()
        .chain(edges.iter())
        .find(|&&i| i as usize >= vertex_count)
    {
        return Err(format!("index {} out of range for {} vertices", index, vertex_count));
    }

    Ok(Geometry {
        vertices: verts.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
        faces: faces.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
        edges: edges.chunks_exact(2).map(|c| [c[0], c[1]]).collect(),
        kind: GeometryKind::Mesh,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
