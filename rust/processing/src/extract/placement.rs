// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement extraction
//!
//! The element's own IfcLocalPlacement must carry a location; without one
//! the element has no location (distinct from the origin). With world
//! coordinates enabled the placement chain is composed parent-first and the
//! placed origin is reported, otherwise the relative location as written.

use twin_bim_geometry::{axis_placement_matrix, Matrix4, Point3, Vector3};

use crate::kernel::{EntityHandle, PlacementNode};
use crate::model::Location;
use crate::outcome::FieldOutcome;
use crate::settings::ShapeSettings;

pub fn extract_location<E: EntityHandle>(entity: &E, settings: &ShapeSettings) -> FieldOutcome<Location> {
    let node = match entity.object_placement() {
        Ok(Some(node)) => node,
        Ok(None) => return FieldOutcome::Default,
        Err(e) => {
            tracing::warn!(entity = entity.id(), error = %e, "placement extraction failed");
            return FieldOutcome::skipped(e);
        }
    };

    let Some(local) = node.location else {
        return FieldOutcome::Default;
    };

    let [x, y, z] = if settings.use_world_coords {
        world_origin(&node)
    } else {
        local
    };

    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        tracing::warn!(entity = entity.id(), "placement resolves to a non-finite point");
        return FieldOutcome::skipped("non-finite placement");
    }
    FieldOutcome::Ok(Location { x, y, z })
}

/// Placed origin of the innermost node of a chain
pub fn world_origin(node: &PlacementNode) -> [f64; 3] {
    let mut chain = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        chain.push(n);
        current = n.relative_to.as_deref();
    }

    let world = chain
        .iter()
        .rev()
        .fold(Matrix4::identity(), |acc, n| acc * node_matrix(n));
    [world[(0, 3)], world[(1, 3)], world[(2, 3)]]
}

fn node_matrix(node: &PlacementNode) -> Matrix4<f64> {
    let location = node
        .location
        .map(|[x, y, z]| Point3::new(x, y, z))
        .unwrap_or_else(Point3::origin);
    let axis = node.axis.map(|[x, y, z]| Vector3::new(x, y, z));
    let ref_direction = node.ref_direction.map(|[x, y, z]| Vector3::new(x, y, z));
    axis_placement_matrix(location, axis, ref_direction)
}
