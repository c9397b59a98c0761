// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::{BoundingBox, Element};

/// Axis-aligned box over every vertex of every element
///
/// No vertices at all gives the zero box.
pub fn bounding_box(elements: &[Element]) -> BoundingBox {
    let mut vertices = elements.iter().flat_map(|e| e.geometry.vertices.iter());

    let Some(first) = vertices.next() else {
        return BoundingBox::default();
    };

    let (min, max) = vertices.fold((*first, *first), |(mut min, mut max), v| {
        for axis in 0..3 {
            min[axis] = min[axis].min(v[axis]);
            max[axis] = max[axis].max(v[axis]);
        }
        (min, max)
    });

    BoundingBox {
        min,
        max,
        size: [max[0] - min[0], max[1] - min[1], max[2] - min[2]],
    }
}
