// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curve processor - polylines become edge lists

use crate::profile::curve_points;
use crate::router::{GeometryProcessor, ItemContext};
use crate::{Mesh, Result};
use twin_bim_core::{DecodedEntity, EntityDecoder};

pub struct PolylineProcessor;

impl GeometryProcessor for PolylineProcessor {
    fn process(&self, entity: &DecodedEntity, decoder: &mut EntityDecoder, _ctx: &ItemContext<'_>) -> Result<Mesh> {
        let points = curve_points(entity, decoder)?;
        let mut mesh = Mesh::with_capacity(points.len(), 0);
        let mut previous = None;
        for p in points {
            let index = mesh.add_vertex(p);
            if let Some(prev) = previous {
                mesh.add_edge(prev, index);
            }
            previous = Some(index);
        }
        Ok(mesh)
    }

    fn supported_types(&self) -> &'static [&'static str] {
        &["IFCPOLYLINE", "IFCINDEXEDPOLYCURVE"]
    }
}
